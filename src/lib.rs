#[macro_use] extern crate log;
extern crate regex;

pub mod assembler;
