pub mod coach;

pub use coach::CoachHandler;
