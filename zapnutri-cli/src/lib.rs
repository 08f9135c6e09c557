// Library exports for the ZapNutri CLI, so the dashboard state and command
// parsing can be tested without a terminal

pub mod commands;
pub mod output;
pub mod ui;
