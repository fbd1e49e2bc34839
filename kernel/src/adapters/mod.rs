// Plan Format Adapters
//
// Decoders from tool-specific plan documents into change records.

pub mod terraform;
