//! Example: Checking a cron status log
//!
//! Reads a status log written by a cron job and prints the line the
//! dashboard would show for it.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example cron_status -- /var/log/cron_last_status.log
//! ```

use std::env;

use statpage_core::read_job_status;

fn main() {
    let path = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example cron_status -- <path-to-status.log>");
        eprintln!();
        eprintln!("The log should end with a line like:");
        eprintln!("  Exit status: 0");
        std::process::exit(1);
    });

    let status = read_job_status(&path);
    println!("Status of {} ({}):", path, status.label());
    for line in status.lines() {
        println!("  {}", line.trim_end());
    }

    if !status.is_healthy() {
        std::process::exit(2);
    }
}
