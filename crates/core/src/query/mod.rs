//! Dynamic query construction: filter maps, typed predicates, ordering
//! and paging.

mod filter;
mod page;
mod predicate;
mod shaping;

pub use filter::{split_filter_key, FilterMap, FilterOp};
pub use page::Page;
pub use predicate::{build_predicate, matches_predicate, parse_clause, Clause, Predicate};
pub use shaping::{order_by, paginate, PageSpec, ResolvedSort, SortSpec, DEFAULT_PAGE_SIZE};
