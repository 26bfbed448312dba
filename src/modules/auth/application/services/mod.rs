pub mod code_hasher;
