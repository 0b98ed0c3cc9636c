//! # grader_core
//!
//! Status reporting primitives for license-grader.
//!
//! Every task in the workspace runs its external commands inside an
//! *operation bracket*: a start banner is printed, the work runs, and a
//! single closing banner reports success, warning, or error together with
//! the elapsed wall-clock time.
//!
//! # Example
//!
//! ```rust
//! use grader_core::{Completion, OutputStyle, Reporter};
//!
//! let mut reporter = Reporter::new(Vec::new(), OutputStyle::plain());
//! let answer: Result<u32, std::io::Error> =
//!     reporter.introduce("Computing answer:", |_| Ok(Completion::clean(42)));
//!
//! assert_eq!(answer.unwrap(), 42);
//! let printed = String::from_utf8(reporter.into_inner()).unwrap();
//! assert!(printed.contains("SUCCESS"));
//! ```

pub mod bracket;
pub mod status;
pub mod style;

pub use bracket::{Elapsed, Reporter, Timer};
pub use status::{Completion, Status};
pub use style::{ColorChoice, OutputStyle};
