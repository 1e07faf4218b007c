// UI layer: console output for the walkthrough, the "Press Enter" pause
// between steps (via `dialoguer`) and a spinner shown while waiting on a
// provisioning request (via `indicatif`).

use crate::error::Result;
use crate::poll::Sleeper;
use crate::procedure::{Step, StepBoundary};
use crossterm::style::Stylize;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::ops::ControlFlow;
use std::thread;
use std::time::Duration;
use tracing::info;

/// Heading printed before each step.
pub fn banner(title: &str) {
    println!("\n{}", format!("Example: {}", title).bold().cyan());
}

pub fn separator() {
    println!("{}", "*".repeat(30).dark_grey());
}

/// Pretty JSON with keys in sorted order.
pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Log `msg` followed by the JSON document it refers to.
pub fn log_result(msg: &str, json: &Value) {
    info!("{} \n\n JSON Result: \n{} \n", msg, pretty_json(json));
}

/// Waits for the operator to press Enter at every step boundary.
pub struct PressEnter;

impl StepBoundary for PressEnter {
    fn reached(&mut self, _step: Step) -> Result<()> {
        // `Input::interact_text()` returns once Enter is pressed; the text
        // itself is ignored.
        let _: String = Input::new()
            .with_prompt("Press Enter to continue...")
            .allow_empty(true)
            .interact_text()?;
        Ok(())
    }
}

/// Step boundary used when running unattended.
pub struct NoPause;

impl StepBoundary for NoPause {
    fn reached(&mut self, step: Step) -> Result<()> {
        tracing::debug!(?step, "step done");
        Ok(())
    }
}

/// Blocks the thread for the poll interval with a spinner on screen.
pub struct SpinnerSleeper;

impl Sleeper for SpinnerSleeper {
    fn sleep(&mut self, interval: Duration) -> ControlFlow<()> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Waiting for the DB request...");
        spinner.enable_steady_tick(Duration::from_millis(120));
        thread::sleep(interval);
        spinner.finish_and_clear();
        ControlFlow::Continue(())
    }
}
