//! devmate: an approval-gated project assistant for the terminal.
//!
//! A language model interprets what the user types into either a plain reply
//! or a structured action (create a project, write files, list the tree,
//! track milestones, draft a presentation outline). Every action that changes
//! anything is shown to the user and only runs after an explicit `y`.
//!
//! # Quick start
//!
//! ```no_run
//! use devmate::api::ApiClient;
//! use devmate::config::load_config;
//! use devmate::executor::Executor;
//! use devmate::interpreter::ModelInterpreter;
//! use devmate::session::Session;
//! use devmate::state::StateStore;
//! use devmate::ui::Renderer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(None)?.config;
//! let store = StateStore::open(&config.workspace.state_dir)?;
//! let executor = Executor::new(store, &config.workspace.projects_dir);
//! let interpreter = ModelInterpreter::new(ApiClient::new(&config.api));
//! let stdin = std::io::stdin().lock();
//! Session::new(interpreter, executor, stdin, Renderer::new(true))
//!     .run()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod api;
pub mod approval;
pub mod build_info;
pub mod config;
pub mod error;
pub mod executor;
pub mod interpreter;
pub mod logging;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod testsupport;
pub mod ui;
