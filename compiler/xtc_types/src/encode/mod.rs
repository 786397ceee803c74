//! Binary encoding of type nodes.
//!
//! # Format
//!
//! ```text
//! magic    b"XTCT"
//! version  u8 (currently 1)
//! count    uleb
//! records  count x (tag byte, fields)
//! roots    uleb count, then uleb record numbers
//! ```
//!
//! Fields are unsigned LEB128 `u32`s except the access byte of an `Access`
//! record and the bound flag of an `Unresolved` record. Child fields are
//! record numbers. Records are written children first, so only placeholder
//! targets refer forward; the decoder accepts forward references anywhere
//! and rejects cycles that do not pass through a placeholder.
//!
//! Class, typedef, method and name fields are raw namespace handles: a
//! stream is only meaningful against the namespace it was written with.
//!
//! | tag | fields |
//! |-----|--------|
//! | class, this-class | class |
//! | typedef, recursive | typedef |
//! | generic | class, name |
//! | type-param | method, register, name |
//! | formal-child, virtual-child | parent, name |
//! | property-class | parent, property |
//! | dynamic-formal | register, name, constraint |
//! | access | access byte, inner |
//! | immutable, service | inner |
//! | parameterized | base, param count, params |
//! | annotated | annotation, inner |
//! | union, intersection, difference | left, right |
//! | inner-child, anonymous-class | parent, class |
//! | unresolved | name, bound flag, target if bound |

mod leb;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use xtc_ir::{Access, ClassId, MethodId, Name, TypedefId};

use crate::{DecodeError, Idx, Pool, Tag, TypeData};

use leb::{write_u32, Reader};

pub const MAGIC: [u8; 4] = *b"XTCT";
pub const VERSION: u8 = 1;

/// Encode `roots` and every node reachable from them, following bound
/// placeholders to their targets.
///
/// # Panics
/// Panics if a root is a sentinel or does not belong to `pool`.
pub fn encode(pool: &Pool, roots: &[Idx]) -> Vec<u8> {
    let mut encoder = Encoder {
        pool,
        numbers: FxHashMap::default(),
        order: Vec::new(),
    };
    for &root in roots {
        assert!(pool.contains(root), "cannot encode {root:?}");
        encoder.visit(root);
    }

    let mut buf = Vec::with_capacity(8 + encoder.order.len() * 3);
    buf.extend_from_slice(&MAGIC);
    buf.push(VERSION);
    write_u32(&mut buf, count(encoder.order.len()));
    for &idx in &encoder.order {
        encoder.write_record(&mut buf, idx);
    }
    write_u32(&mut buf, count(roots.len()));
    for root in roots {
        write_u32(&mut buf, encoder.numbers[root]);
    }
    tracing::debug!(
        records = encoder.order.len(),
        roots = roots.len(),
        bytes = buf.len(),
        "encoded type nodes"
    );
    buf
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("type encoding exceeded u32::MAX records"))
}

struct Encoder<'p> {
    pool: &'p Pool,
    numbers: FxHashMap<Idx, u32>,
    order: Vec<Idx>,
}

impl Encoder<'_> {
    fn number(&mut self, idx: Idx) {
        let next = count(self.order.len());
        self.numbers.insert(idx, next);
        self.order.push(idx);
    }

    fn visit(&mut self, idx: Idx) {
        if self.numbers.contains_key(&idx) {
            return;
        }
        if self.pool.cell_of(idx).is_some() {
            // Numbered before its target so cycles through it terminate.
            self.number(idx);
            if let Some(target) = self.pool.placeholder_target(idx) {
                xtc_stack::ensure_sufficient_stack(|| self.visit(target));
            }
            return;
        }
        for child in self.pool.data(idx).children() {
            xtc_stack::ensure_sufficient_stack(|| self.visit(child));
        }
        // A placeholder among the children may have led back here.
        if !self.numbers.contains_key(&idx) {
            self.number(idx);
        }
    }

    fn write_record(&self, buf: &mut Vec<u8>, idx: Idx) {
        let data = self.pool.data(idx);
        buf.push(data.tag() as u8);
        let child = |buf: &mut Vec<u8>, idx: &Idx| write_u32(buf, self.numbers[idx]);
        match data {
            TypeData::Class(class) | TypeData::ThisClass(class) => write_u32(buf, class.raw()),
            TypeData::Typedef(typedef) | TypeData::Recursive(typedef) => {
                write_u32(buf, typedef.raw());
            }
            TypeData::Generic { class, name } => {
                write_u32(buf, class.raw());
                write_u32(buf, name.raw());
            }
            TypeData::TypeParam {
                method,
                register,
                name,
            } => {
                write_u32(buf, method.raw());
                write_u32(buf, *register);
                write_u32(buf, name.raw());
            }
            TypeData::FormalChild { parent, name } | TypeData::VirtualChild { parent, name } => {
                child(buf, parent);
                write_u32(buf, name.raw());
            }
            TypeData::PropertyClass { parent, property } => {
                child(buf, parent);
                write_u32(buf, property.raw());
            }
            TypeData::DynamicFormal {
                register,
                name,
                constraint,
            } => {
                write_u32(buf, *register);
                write_u32(buf, name.raw());
                child(buf, constraint);
            }
            TypeData::Access { access, inner } => {
                buf.push(*access as u8);
                child(buf, inner);
            }
            TypeData::Immutable(inner) | TypeData::Service(inner) => child(buf, inner),
            TypeData::Parameterized { base, params } => {
                child(buf, base);
                write_u32(buf, count(params.len()));
                for param in params {
                    child(buf, param);
                }
            }
            TypeData::Annotated { annotation, inner } => {
                child(buf, annotation);
                child(buf, inner);
            }
            TypeData::Union(a, b) | TypeData::Intersection(a, b) | TypeData::Difference(a, b) => {
                child(buf, a);
                child(buf, b);
            }
            TypeData::InnerChild { parent, class } | TypeData::AnonymousClass { parent, class } => {
                child(buf, parent);
                write_u32(buf, class.raw());
            }
            TypeData::Unresolved(_) => {
                let name = self.pool.placeholder_name(idx).map_or(0, Name::raw);
                write_u32(buf, name);
                match self.pool.placeholder_target(idx) {
                    Some(target) => {
                        buf.push(1);
                        child(buf, &target);
                    }
                    None => buf.push(0),
                }
            }
        }
    }
}

/// A parsed record. Child fields of `Node` hold record numbers in place of
/// pool indices.
enum Record {
    Node(TypeData),
    Placeholder { name: Name, target: Option<u32> },
}

#[derive(Copy, Clone)]
enum Slot {
    Unvisited,
    InProgress,
    Done(Idx),
}

/// Decode a stream into `pool`, returning the roots in stream order.
///
/// Nodes already present in `pool` are shared; every placeholder record
/// gets a fresh cell, bound when the stream names a target. On error,
/// nodes registered before the failure stay interned.
pub fn decode_into(pool: &mut Pool, bytes: &[u8]) -> Result<Vec<Idx>, DecodeError> {
    let mut reader = Reader::new(bytes);
    if reader.take(MAGIC.len()).map_err(|_| DecodeError::BadMagic)? != MAGIC {
        return Err(DecodeError::BadMagic);
    }
    let version = reader.byte()?;
    if version != VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }

    let count = reader.u32()?;
    // Every record is at least two bytes, so a count beyond the input is a
    // truncated stream rather than a reason to allocate.
    let capacity = (count as usize).min(reader.remaining() / 2);
    let mut records = Vec::with_capacity(capacity);
    for record in 0..count {
        records.push(read_record(&mut reader, record, count)?);
    }
    let root_count = reader.u32()?;
    let mut roots = Vec::with_capacity((root_count as usize).min(reader.remaining()));
    for _ in 0..root_count {
        let target = reader.u32()?;
        if target >= count {
            return Err(DecodeError::BadReference {
                record: count,
                target,
                count,
            });
        }
        roots.push(target);
    }
    if reader.remaining() != 0 {
        return Err(DecodeError::TrailingBytes(reader.remaining()));
    }

    let mut decoder = Decoder {
        pool,
        records: &records,
        slots: vec![Slot::Unvisited; records.len()],
    };
    for (record, parsed) in records.iter().enumerate() {
        if let Record::Placeholder { name, .. } = parsed {
            let cell = decoder.pool.unresolved(*name);
            decoder.slots[record] = Slot::Done(cell);
        }
    }
    for record in 0..count {
        decoder.register(record)?;
    }
    decoder.bind_cells()?;

    let out: Vec<Idx> = roots.iter().map(|&r| decoder.idx(r)).collect();
    tracing::debug!(records = count, roots = out.len(), "decoded type nodes");
    Ok(out)
}

fn read_record(reader: &mut Reader<'_>, record: u32, count: u32) -> Result<Record, DecodeError> {
    let raw = reader.byte()?;
    let tag = Tag::from_u8(raw).ok_or(DecodeError::UnknownTag { record, tag: raw })?;
    let child = |reader: &mut Reader<'_>| -> Result<Idx, DecodeError> {
        let target = reader.u32()?;
        if target >= count {
            return Err(DecodeError::BadReference {
                record,
                target,
                count,
            });
        }
        Ok(Idx::from_raw(target))
    };
    let data = match tag {
        Tag::Class => TypeData::Class(ClassId::from_raw(reader.u32()?)),
        Tag::ThisClass => TypeData::ThisClass(ClassId::from_raw(reader.u32()?)),
        Tag::Typedef => TypeData::Typedef(TypedefId::from_raw(reader.u32()?)),
        Tag::Recursive => TypeData::Recursive(TypedefId::from_raw(reader.u32()?)),
        Tag::Generic => TypeData::Generic {
            class: ClassId::from_raw(reader.u32()?),
            name: Name::from_raw(reader.u32()?),
        },
        Tag::TypeParam => TypeData::TypeParam {
            method: MethodId::from_raw(reader.u32()?),
            register: reader.u32()?,
            name: Name::from_raw(reader.u32()?),
        },
        Tag::FormalChild => TypeData::FormalChild {
            parent: child(reader)?,
            name: Name::from_raw(reader.u32()?),
        },
        Tag::VirtualChild => TypeData::VirtualChild {
            parent: child(reader)?,
            name: Name::from_raw(reader.u32()?),
        },
        Tag::PropertyClass => TypeData::PropertyClass {
            parent: child(reader)?,
            property: Name::from_raw(reader.u32()?),
        },
        Tag::DynamicFormal => TypeData::DynamicFormal {
            register: reader.u32()?,
            name: Name::from_raw(reader.u32()?),
            constraint: child(reader)?,
        },
        Tag::Access => {
            let value = reader.byte()?;
            let access =
                Access::from_u8(value).ok_or(DecodeError::InvalidAccess { record, value })?;
            TypeData::Access {
                access,
                inner: child(reader)?,
            }
        }
        Tag::Immutable => TypeData::Immutable(child(reader)?),
        Tag::Service => TypeData::Service(child(reader)?),
        Tag::Parameterized => {
            let base = child(reader)?;
            let len = reader.u32()?;
            let mut params = SmallVec::new();
            for _ in 0..len {
                params.push(child(reader)?);
            }
            TypeData::Parameterized { base, params }
        }
        Tag::Annotated => TypeData::Annotated {
            annotation: child(reader)?,
            inner: child(reader)?,
        },
        Tag::Union => TypeData::Union(child(reader)?, child(reader)?),
        Tag::Intersection => TypeData::Intersection(child(reader)?, child(reader)?),
        Tag::Difference => TypeData::Difference(child(reader)?, child(reader)?),
        Tag::InnerChild => TypeData::InnerChild {
            parent: child(reader)?,
            class: ClassId::from_raw(reader.u32()?),
        },
        Tag::AnonymousClass => TypeData::AnonymousClass {
            parent: child(reader)?,
            class: ClassId::from_raw(reader.u32()?),
        },
        Tag::Unresolved => {
            let name = Name::from_raw(reader.u32()?);
            let target = match reader.byte()? {
                0 => None,
                _ => Some(child(reader)?.raw()),
            };
            return Ok(Record::Placeholder { name, target });
        }
    };
    Ok(Record::Node(data))
}

struct Decoder<'p, 'r> {
    pool: &'p mut Pool,
    records: &'r [Record],
    slots: Vec<Slot>,
}

impl Decoder<'_, '_> {
    fn idx(&self, record: u32) -> Idx {
        match self.slots[record as usize] {
            Slot::Done(idx) => idx,
            Slot::Unvisited | Slot::InProgress => {
                unreachable!("record {record} read before registration")
            }
        }
    }

    fn register(&mut self, record: u32) -> Result<Idx, DecodeError> {
        match self.slots[record as usize] {
            Slot::Done(idx) => return Ok(idx),
            Slot::InProgress => return Err(DecodeError::Cycle { record }),
            Slot::Unvisited => {}
        }
        let Record::Node(data) = &self.records[record as usize] else {
            unreachable!("placeholder records are allocated up front")
        };
        self.slots[record as usize] = Slot::InProgress;
        let mut children: SmallVec<[Idx; 4]> = SmallVec::new();
        for child in data.children() {
            let idx = xtc_stack::ensure_sufficient_stack(|| self.register(child.raw()))?;
            children.push(idx);
        }
        let node = data.with_children(&children);
        let idx = self
            .pool
            .register(node)
            .map_err(|source| DecodeError::Rejected { record, source })?;
        self.slots[record as usize] = Slot::Done(idx);
        Ok(idx)
    }

    fn bind_cells(&mut self) -> Result<(), DecodeError> {
        for (record, parsed) in self.records.iter().enumerate() {
            let Record::Placeholder {
                target: Some(target),
                ..
            } = parsed
            else {
                continue;
            };
            let record = count(record);
            let cell = self.idx(record);
            let target = self.idx(*target);
            if self.pool.deref(target) == cell {
                return Err(DecodeError::Cycle { record });
            }
            self.pool.resolve_placeholder(cell, target);
        }
        Ok(())
    }
}
