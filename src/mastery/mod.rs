pub mod aggregator;
pub mod config;
pub mod engine;
pub mod exam;
pub mod gate;
pub mod reducer;
pub mod selector;
pub mod types;

pub use config::{DenominatorPolicy, MasteryConfig};
pub use engine::{EngineError, MasteryEngine, UserStats};
pub use exam::{ComposedExam, ExamLock, ExamOutcome};
pub use selector::{SelectionPolicy, SessionSelection};
pub use types::*;
