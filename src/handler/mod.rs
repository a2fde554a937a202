mod completion;

pub use completion::CompletionHandler;
