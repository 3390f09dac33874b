pub mod report;
pub mod ring_buffer;
