//! CLI command definitions and terminal listings.
//!
//! Uses clap derive macros for ergonomic argument definitions.

pub mod args;

use colored::Colorize;

use presence_picker::models::{AvatarIndex, UserDirectory};

/// Tool banner with ANSI styling for clap help output.
pub const ABOUT_STYLED: &str =
    "\x1b[1mpresence-picker\x1b[0m \x1b[2m· Pick a user, see their presence.\x1b[0m";

/// Render the users listing as aligned `id  name  avatar` rows.
pub fn format_users(directory: &UserDirectory, avatars: &AvatarIndex) -> String {
    if directory.is_empty() {
        return format!("{}\n", "No users found.".dimmed());
    }

    let id_width = directory.iter().map(|u| u.id.as_str().len()).max().unwrap_or(0);
    let name_width = directory.iter().map(|u| u.name.chars().count()).max().unwrap_or(0);

    let mut output = String::new();
    for user in directory.iter() {
        let avatar = avatars.get(&user.id).unwrap_or("-");
        output.push_str(&format!(
            "  {}  {:<name_width$}  {}\n",
            format!("{:>id_width$}", user.id).bold(),
            user.name,
            avatar.dimmed(),
        ));
    }
    output.push_str(&format!(
        "{}\n",
        format!("  {} user(s)", directory.len()).dimmed()
    ));
    output
}
