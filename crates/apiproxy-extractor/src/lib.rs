//! Source metadata extraction for generated API proxy modules.
//!
//! Reads the text of a generated `apiProxy.js` and recovers, for every
//! callable in the exported aggregate, its name, cleaned documentation and
//! ordered parameter names. The module is never executed; the text alone is
//! the contract.
//!
//! # Examples
//!
//! ```
//! use apiproxy_extractor::{extract, parse_param_tags};
//!
//! let source = "export const apiProxy = {\n\
//!   /**\n\
//!    * POST /api/reversemsg\n\
//!    * @param {object} message - Request body.\n\
//!    */\n\
//!   reversemsg: async (message) => { return message; },\n\
//! };";
//!
//! let extraction = extract(source);
//! let reverse = extraction.metadata.get("reversemsg").unwrap();
//! assert_eq!(reverse.params, vec!["message"]);
//!
//! let tags = parse_param_tags(&reverse.jsdoc);
//! assert!(tags[0].is_structured_type());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod docblock;
mod extract;
mod lexer;
mod verify;

pub use docblock::{ParamTag, has_auth_tag, param_tag, parse_param_tags};
pub use extract::{AGGREGATE_NAME, ExtractIssue, Extraction, extract};
pub use verify::{Mismatch, verify_round_trip};
