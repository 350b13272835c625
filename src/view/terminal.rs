//! Terminal surface: prints region changes as styled, flowing text.
//!
//! Output is written when a region becomes visible (or its text changes
//! while visible); hiding a region prints nothing.

use std::io::{self, Write};

use colored::Colorize;

use super::memory::MemorySurface;
use super::{ImageHandle, Region, SelectOption, Surface};

/// Surface backed by a terminal (or any writer).
pub struct TerminalSurface {
    out: Box<dyn Write + Send>,
    state: MemorySurface,
}

impl TerminalSurface {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            state: MemorySurface::default(),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    fn print_region(&mut self, region: Region) {
        let text = match region {
            Region::Loading => format!("  {} {}\n", "◌".cyan().bold(), "loading…".dimmed()),
            Region::Selector => render_options(self.state.options()),
            Region::ErrorText => {
                format!("  {} {}\n", "✖".red().bold(), self.state.text(region).red())
            }
            Region::Chart => format!("{}\n", self.state.text(region)),
            Region::Avatar => match self.state.avatar_source() {
                Some(src) => format!("  {} {}\n", "avatar:".cyan(), src),
                None => format!("  {} {}\n", "avatar:".cyan(), "none".dimmed()),
            },
        };
        // Terminal output is best effort; a closed pipe must not take the
        // selector down.
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }
}

impl Surface for TerminalSurface {
    fn set_visible(&mut self, region: Region, visible: bool) {
        let was_visible = self.state.is_visible(region);
        self.state.set_visible(region, visible);
        if visible && !was_visible {
            self.print_region(region);
        }
    }

    fn set_text(&mut self, region: Region, text: &str) {
        let changed = self.state.text(region) != text;
        self.state.set_text(region, text);
        if changed && self.state.is_visible(region) {
            self.print_region(region);
        }
    }

    fn set_options(&mut self, options: &[SelectOption]) {
        self.state.set_options(options);
    }

    fn create_avatar_image(&mut self, source: Option<&str>) -> ImageHandle {
        self.state.create_avatar_image(source)
    }

    fn set_image_source(&mut self, image: ImageHandle, source: Option<&str>) {
        self.state.set_image_source(image, source);
        if self.state.is_visible(Region::Avatar) {
            self.print_region(Region::Avatar);
        }
    }
}

fn render_options(options: &[SelectOption]) -> String {
    if options.is_empty() {
        return format!("  {}\n", "No users available.".dimmed());
    }
    let width = options.iter().map(|o| o.value.len()).max().unwrap_or(0);
    let mut output = String::new();
    for option in options {
        output.push_str(&format!(
            "  {}  {}\n",
            format!("{:>width$}", option.value).bold(),
            option.label,
        ));
    }
    output
}
