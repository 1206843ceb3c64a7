// Coaching chat: crisis detection, mode prompts, model replies and message persistence.
// All model calls go through `responder::CoachModel`.

pub mod conversations;
pub mod crisis;
pub mod handlers;
pub mod prompts;
pub mod responder;
