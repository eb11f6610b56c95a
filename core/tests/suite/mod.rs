mod pipeline;
mod properties;
mod scenarios;
