mod fortune;
mod palm_line;
mod symbol;
mod user_context;
mod validation;

pub use fortune::{FortuneResult, Reading, Readings};
pub use palm_line::{LineRecord, PalmLine};
pub use symbol::{Position, ShapeType, Size, SymbolCategory, SymbolRecord};
pub use user_context::{MaritalStatus, Mood, UserContext, UserProfile};
pub use validation::{ValidationReason, ValidationResult};
