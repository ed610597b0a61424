use colored::*;

use super::print;

const BANNER_0: &str = r#"
                           _
           _ __  _ __ ___ | |__  _ __
          | '_ \| '__/ _ \| '_ \| '__|
          | |_) | | | (_) | |_) | |
          | .__/|_|  \___/|_.__/|_|
          |_|
"#;

pub fn print() {
    print::print(&format!("{}", BANNER_0.bright_green().bold()));
}
