pub mod coffee_interpreter;
pub mod knowledge_base;
pub mod palm_interpreter;
pub mod random_source;

pub use coffee_interpreter::CoffeeInterpreter;
pub use knowledge_base::{KnowledgeBase, Phrases};
pub use palm_interpreter::{PalmInterpreter, UNCLEAR_PALM};
pub use random_source::RandomSource;
