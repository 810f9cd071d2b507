// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # dotmend
//!
//! Repairs a .NET metadata graph that has lost member definitions during an
//! ahead-of-time stripping transformation, by consulting a complete reference
//! graph of the same logical program and synthesizing the missing members
//! into the stripped graph.
//!
//! ## How it works
//!
//! Two parallel metadata graphs exist per run: the **reference graph** (every
//! assembly, type and method as originally authored; read-only) and the
//! **target graph** (stripped; type shells present, members missing;
//! append-only). A [`MendContext`](mend::context::MendContext) pairs the two
//! by name, and the [`MemberRestorer`](mend::unstrip::MemberRestorer) walks
//! the reference graph in declaration order, rebuilding the signature of
//! every missing method through the
//! [`TypeResolver`](mend::resolver::TypeResolver): a pure function from
//! reference-graph type references to target-graph type references.
//!
//! Methods whose signatures cannot be resolved are skipped whole and counted;
//! the pass itself never fails. Repeated runs over identical inputs are
//! idempotent and byte-for-byte deterministic.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use dotmend::prelude::*;
//!
//! // the complete build
//! let reference = Arc::new(MetadataGraph::new());
//! let ref_asm = reference.add_assembly("Game.Core")?;
//! let ref_player = TypeBuilder::new(&ref_asm, "Player").namespace("Game").build()?;
//! MethodBuilder::new(&ref_asm, &ref_player, "GetHealth")
//!     .returns(TypeRef::simple("mscorlib", "System", "Int32", TypeFlavor::I4))
//!     .build();
//!
//! // the stripped build: the type shell survived, the method did not
//! let target = Arc::new(MetadataGraph::new());
//! let target_asm = target.add_assembly("Game.Core")?;
//! TypeBuilder::new(&target_asm, "Player").namespace("Game").build()?;
//!
//! let context = MendContext::new(reference, target);
//! context.pair_by_name();
//!
//! let stubs = DelegateStubGenerator;
//! let bodies = DeferredBodyQueue::new();
//! let stats = MemberRestorer::new(&stubs, &bodies, &NoOverloads).run(&context);
//! assert_eq!(stats.restored, 1);
//! # Ok::<(), dotmend::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - tokens, type system, member nodes, and the graph arenas
//! - [`mend`] - coordinate map, import tables, the resolver and the engine
//! - [`prelude`] - convenient re-exports of commonly used types
//! - [`Error`] and [`Result`] - error handling for graph construction
//!
//! ## What is out of scope
//!
//! Assembly files never enter this crate: graphs are built in memory through
//! the builders, typically by a loader living elsewhere. Instruction-level
//! body synthesis and marshalling are behind the collaborator seams in
//! [`mend::collaborators`].

pub(crate) mod error;

/// Convenient re-exports of the most commonly used types.
pub mod prelude;

/// Definitions and storage for the two metadata graphs a repair run works on.
pub mod metadata;

/// The repair pipeline: coordinate map, imports, resolver, and the engine.
pub mod mend;

/// `dotmend` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is
/// always [`Error`], used for all fallible graph construction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `dotmend` Error type
///
/// The main error type for graph construction. The repair pass itself never
/// returns errors; unresolvable members degrade to counters on
/// [`mend::unstrip::RestoreStats`].
pub use error::Error;
