//! Banner
//!
//! Startup banner for the setup wizard.

use colored::Colorize;

pub fn show_banner() {
    println!();
    println!("{}", "  ┌─────────────────────────────────┐".cyan());
    println!("{}", "  │  tabula -- CSV → JSON agent     │".cyan());
    println!("{}", "  │  Vertex AI deployment tool      │".cyan());
    println!("{}", "  └─────────────────────────────────┘".cyan());
    println!();
}
