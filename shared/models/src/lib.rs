//! # Gazette Watch Domain Models
//!
//! Plain data shared by the retrieval, document-processing and email
//! services.
//!
//! ## Key Models
//!
//! - **GazetteDate**: an edition date, rendered as the remote URL key and the human label
//! - **Page**: one downloaded PDF page on local disk
//! - **PublicationSegment**: one publication cut out of a page's extracted text
//! - **MatchResult**: matching publications per file; its keys are the pages to attach

pub mod gazette;
pub mod publication;


pub use gazette::*;
pub use publication::*;
