//! The immutable (save for its sources' free areas) input to one
//! allocation call, and the five placement policies it can be driven by.

use std::str::FromStr;

use crate::error::AllocError;
use crate::segment::Segment;
use crate::source::Source;

/// The five placement policies the selector can be asked to apply.
///
/// A sixth, "inherit the parent volume's policy", is deliberately not
/// modeled here: it has no meaning at this layer, since a `Request` always
/// names one concrete policy to apply. Callers managing a policy
/// inheritance chain of their own resolve it to one of the five below
/// before building a [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocPolicy {
    /// First area with any free space. No size check, splitting always
    /// permitted.
    Anywhere,
    /// Largest-area-first when splitting is allowed, first-fit-contiguous
    /// otherwise. The default policy for most requests.
    Normal,
    /// A single contiguous area; splitting is never permitted regardless of
    /// `can_split`.
    Contiguous,
    /// Prefers sources already used by `parallel_areas`, falling back to
    /// `Normal` unless `maximise_cling` forbids it.
    Cling,
    /// Like `Cling`, but affinity is tag intersection rather than source
    /// identity.
    ClingByTags,
}

/// One tag-matching expression from `cling_tag_list`: either "any shared
/// tag" or a specific tag name, written `@*` and `@tagname` respectively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagMatch {
    /// Matches when the two sources share any tag at all.
    Wildcard,
    /// Matches when both sources carry this specific tag.
    Literal(String),
}

impl TagMatch {
    /// Whether `a` and `b` are considered affine under this expression.
    pub fn matches<H>(&self, a: &Source<H>, b: &Source<H>) -> bool {
        match self {
            TagMatch::Wildcard => a.shares_any_tag(b),
            TagMatch::Literal(tag) => a.has_tag(tag) && b.has_tag(tag),
        }
    }
}

impl FromStr for TagMatch {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('@')
            .ok_or_else(|| AllocError::InvalidTagExpression(s.to_string()))?;
        if rest.is_empty() {
            return Err(AllocError::InvalidTagExpression(s.to_string()));
        }
        if rest == "*" {
            Ok(TagMatch::Wildcard)
        } else {
            Ok(TagMatch::Literal(rest.to_string()))
        }
    }
}

/// Behavioral flags for one allocation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocFlags {
    /// Allow the request to be satisfied by more than one segment.
    pub can_split: bool,
    /// A partial result is acceptable; purely advisory to the caller,
    /// never changes what the allocator keeps.
    pub approx_alloc: bool,
    /// Under `Cling`/`ClingByTags`, require affinity rather than falling
    /// back to `Normal` when no affine source has room.
    pub maximise_cling: bool,
    /// Require the trailing `log_area_count` slots to avoid sharing a
    /// source with each other, in addition to whatever
    /// `parallel_areas_separate` already requires of them.
    pub mirror_logs_separate: bool,
    /// Require every parallel area (including parity and log slots) to land
    /// on a distinct source within a single round, the redundancy
    /// constraint for mirrors and RAID.
    pub parallel_areas_separate: bool,
}

/// Immutable input to one allocation call. The one exception to
/// immutability is `sources`: their free areas are mutated in place over
/// the course of the call, so callers must not share a `Request`
/// concurrently.
#[derive(Debug, Clone)]
pub struct Request<H> {
    pub sources: Vec<Source<H>>,
    pub area_count: u32,
    pub parity_count: u32,
    pub log_area_count: u32,
    pub log_len: u32,
    pub metadata_area_count: u32,
    pub region_size: u32,
    pub new_extents: u64,
    pub area_multiple: u32,
    pub alloc: AllocPolicy,
    pub parallel_areas: Vec<Segment<H>>,
    pub cling_tag_list: Vec<TagMatch>,
    pub flags: AllocFlags,
}

impl<H> Request<H> {
    /// A request with the given sources, total extents and policy, and all
    /// other fields at their defaults (single area, no splitting, no
    /// affinity).
    pub fn new(sources: Vec<Source<H>>, new_extents: u64, alloc: AllocPolicy) -> Self {
        Request {
            sources,
            area_count: 1,
            parity_count: 0,
            log_area_count: 0,
            log_len: 0,
            metadata_area_count: 0,
            region_size: 0,
            new_extents,
            area_multiple: 0,
            alloc,
            parallel_areas: Vec::new(),
            cling_tag_list: Vec::new(),
            flags: AllocFlags::default(),
        }
    }

    /// Total number of parallel outputs: data areas, parity areas, and
    /// log/metadata areas, defaulting to one when all of `area_count`,
    /// `parity_count` and `log_area_count` are zero.
    pub(crate) fn num_parallel_areas(&self) -> usize {
        let areas = self.area_count + self.parity_count + self.log_area_count;
        if areas == 0 {
            1
        } else {
            areas as usize
        }
    }

    /// Per-area target extent count: `new_extents / area_multiple` when
    /// `area_multiple` is nonzero, else `new_extents` unchanged.
    pub(crate) fn per_area_target(&self) -> u64 {
        if self.area_multiple == 0 {
            self.new_extents
        } else {
            self.new_extents / self.area_multiple as u64
        }
    }
}
