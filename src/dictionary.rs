//! The string table shared in shape by the encoder and decoder.
//!
//! Every entry is an `(symbol, prefix)` pair living in a single arena indexed
//! by code. A second, open-addressed index maps `(symbol, prefix)` back to the
//! code; it stores codes rather than references, so the arena stays the only
//! source of truth.
//!
//! A [`Dictionary`] is one *generation*: pruning never edits it in place but
//! builds a successor with renumbered codes while reading the old one.

use crate::code::{Code, ALPHABET_SIZE, EMPTY, NUM_SPECIALS};
use ahash::RandomState;
use log::debug;
use std::fmt;
use std::hash::BuildHasher;

/// Fixed seeds keep probe sequences identical from run to run.
const INDEX_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// One string table entry.
///
/// Following `prefix` from entry to entry until [`EMPTY`] spells the string
/// for `code` backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    code: Code,
    symbol: u8,
    prefix: Code,
    last_used: u64,
}

impl Entry {
    pub fn code(&self) -> Code {
        self.code
    }

    /// Last symbol of the string.
    pub fn symbol(&self) -> u8 {
        self.symbol
    }

    /// Code of the string minus its last symbol, or [`EMPTY`].
    pub fn prefix(&self) -> Code {
        self.prefix
    }

    /// Timer value of the most recent transmission of this code; 0 if never sent.
    pub fn last_used(&self) -> u64 {
        self.last_used
    }
}

/// A fixed-capacity, dual-indexed string table.
///
/// # Invariants
/// - `entries[i].code == i + NUM_SPECIALS`; codes 0..NUM_SPECIALS are
///   reserved and never resolve
/// - every prefix is [`EMPTY`] or a code lower than its own
/// - `slots` holds each live code exactly once; [`EMPTY`] marks a vacant slot
/// - `len() <= capacity`
#[derive(Clone)]
pub struct Dictionary {
    capacity: usize,
    escape: bool,
    entries: Vec<Entry>,
    slots: Vec<Code>,
    hasher: RandomState,
}

impl Dictionary {
    /// Creates a generation holding the reserved codes and, unless `escape`
    /// is set, one single-symbol entry per byte value (codes 4..260).
    pub fn new(capacity: usize, escape: bool) -> Self {
        debug_assert!(
            capacity >= NUM_SPECIALS as usize + ALPHABET_SIZE,
            "capacity {} cannot hold the preloaded table",
            capacity
        );

        let [k0, k1, k2, k3] = INDEX_SEEDS;
        let mut dictionary = Self {
            capacity,
            escape,
            entries: Vec::new(),
            slots: vec![EMPTY; 2 * capacity + 1],
            hasher: RandomState::with_seeds(k0, k1, k2, k3),
        };

        if !escape {
            for symbol in 0..=u8::MAX {
                dictionary.insert(symbol, EMPTY);
            }
        }

        dictionary
    }

    /// Number of codes in use, reserved ones included.
    pub fn len(&self) -> usize {
        self.entries.len() + NUM_SPECIALS as usize
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn free_slots(&self) -> usize {
        self.capacity - self.len()
    }

    pub fn is_full(&self) -> bool {
        self.free_slots() == 0
    }

    pub fn escape(&self) -> bool {
        self.escape
    }

    /// Live entries in code order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Looks an entry up by code. Reserved and unassigned codes are absent.
    pub fn lookup_code(&self, code: Code) -> Option<&Entry> {
        let index = code.checked_sub(NUM_SPECIALS)?;
        self.entries.get(index as usize)
    }

    /// Finds the entry extending `prefix` by `symbol`.
    pub fn lookup_extension(&self, symbol: u8, prefix: Code) -> Option<&Entry> {
        let mut slot = self.home_slot(symbol, prefix);
        loop {
            let code = self.slots[slot];
            if code == EMPTY {
                return None;
            }
            let entry = self.entry(code);
            if entry.symbol == symbol && entry.prefix == prefix {
                return Some(entry);
            }
            slot = (slot + 1) % self.slots.len();
        }
    }

    /// Adds `(symbol, prefix)` under the next sequential code.
    ///
    /// Callers check [`free_slots`](Self::free_slots) first; inserting into a
    /// full table is a no-op returning `None`.
    pub fn insert(&mut self, symbol: u8, prefix: Code) -> Option<Code> {
        debug_assert!(!self.is_full(), "insert into a full dictionary");
        if self.is_full() {
            return None;
        }

        let code = self.len() as Code;
        let mut slot = self.home_slot(symbol, prefix);
        while self.slots[slot] != EMPTY {
            slot = (slot + 1) % self.slots.len();
        }
        self.slots[slot] = code;

        self.entries.push(Entry {
            code,
            symbol,
            prefix,
            last_used: 0,
        });
        Some(code)
    }

    /// Stamps `code` as sent at `time`. Absent codes are ignored.
    pub fn mark_used(&mut self, code: Code, time: u64) {
        if let Some(index) = code.checked_sub(NUM_SPECIALS) {
            if let Some(entry) = self.entries.get_mut(index as usize) {
                entry.last_used = time;
            }
        }
    }

    /// Walks the prefix chain of `code`, leaf first.
    pub fn chain(&self, code: Code) -> Chain<'_> {
        Chain {
            dictionary: self,
            next: code,
        }
    }

    /// Builds the next generation, keeping entries sent after
    /// `now - window` together with every prefix they depend on.
    ///
    /// Survivors are renumbered densely in ascending order of their old
    /// codes, each prefix before its extensions, and keep their timestamps.
    /// Without escape mode the single-symbol entries keep codes 4..260
    /// regardless of age.
    pub fn prune(&self, window: u32, now: u64) -> Dictionary {
        let cutoff = now.saturating_sub(u64::from(window));
        let mut next = Dictionary::new(self.capacity, self.escape);

        // old code -> new code for everything already carried over
        let mut carried: Vec<Option<Code>> = vec![None; self.len()];
        carried[EMPTY as usize] = Some(EMPTY);
        if !self.escape {
            for code in NUM_SPECIALS..NUM_SPECIALS + ALPHABET_SIZE as Code {
                carried[code as usize] = Some(code);
            }
        }

        let mut pending: Vec<Code> = Vec::new();
        for entry in &self.entries {
            if entry.last_used <= cutoff || carried[entry.code as usize].is_some() {
                continue;
            }

            let mut code = entry.code;
            while carried[code as usize].is_none() {
                pending.push(code);
                code = self.entry(code).prefix;
            }

            while let Some(old) = pending.pop() {
                let survivor = self.entry(old);
                let prefix = carried[survivor.prefix as usize];
                debug_assert!(prefix.is_some(), "prefix is carried before its extensions");
                let Some(new) = prefix.and_then(|prefix| next.insert(survivor.symbol, prefix))
                else {
                    pending.clear();
                    break;
                };
                next.mark_used(new, survivor.last_used);
                carried[old as usize] = Some(new);
            }
        }

        debug!(
            "pruned dictionary: {} -> {} codes (cutoff {}, now {})",
            self.len(),
            next.len(),
            cutoff,
            now
        );
        next
    }

    #[inline]
    fn entry(&self, code: Code) -> &Entry {
        &self.entries[(code - NUM_SPECIALS) as usize]
    }

    #[inline]
    fn home_slot(&self, symbol: u8, prefix: Code) -> usize {
        let hash = BuildHasher::hash_one(&self.hasher, (prefix, symbol));
        (hash % self.slots.len() as u64) as usize
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("escape", &self.escape)
            .finish_non_exhaustive()
    }
}

/// Iterator over a prefix chain, from the given code back to its root.
pub struct Chain<'a> {
    dictionary: &'a Dictionary,
    next: Code,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.dictionary.lookup_code(self.next)?;
        self.next = entry.prefix;
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(symbol: u8) -> Code {
        NUM_SPECIALS + Code::from(symbol)
    }

    fn spell(dictionary: &Dictionary, code: Code) -> Vec<u8> {
        let mut bytes: Vec<u8> = dictionary.chain(code).map(|e| e.symbol()).collect();
        bytes.reverse();
        bytes
    }

    #[test]
    fn test_preloaded_table() {
        let dictionary = Dictionary::new(512, false);
        assert_eq!(dictionary.len(), 260);
        assert_eq!(dictionary.free_slots(), 252);

        for code in 0..NUM_SPECIALS {
            assert!(dictionary.lookup_code(code).is_none());
        }
        for symbol in 0..=u8::MAX {
            let entry = dictionary.lookup_extension(symbol, EMPTY).unwrap();
            assert_eq!(entry.code(), root(symbol));
            assert_eq!(dictionary.lookup_code(root(symbol)), Some(entry));
        }
        assert!(dictionary.lookup_code(260).is_none());
    }

    #[test]
    fn test_escape_table_starts_empty() {
        let dictionary = Dictionary::new(512, true);
        assert_eq!(dictionary.len(), NUM_SPECIALS as usize);
        assert_eq!(dictionary.entries().count(), 0);
        assert!(dictionary.lookup_extension(b'a', EMPTY).is_none());
        assert!(dictionary.lookup_code(NUM_SPECIALS).is_none());
    }

    #[test]
    fn test_insert_assigns_sequential_codes() {
        let mut dictionary = Dictionary::new(512, false);
        let ab = dictionary.insert(b'b', root(b'a')).unwrap();
        let abc = dictionary.insert(b'c', ab).unwrap();

        assert_eq!(ab, 260);
        assert_eq!(abc, 261);
        assert_eq!(dictionary.len(), 262);
        assert_eq!(dictionary.lookup_extension(b'c', ab).unwrap().code(), abc);
        assert!(dictionary.lookup_extension(b'c', root(b'a')).is_none());
        assert_eq!(spell(&dictionary, abc), b"abc");
        assert_eq!(dictionary.lookup_code(abc).unwrap().last_used(), 0);
    }

    #[test]
    fn test_colliding_entries_stay_reachable() {
        let mut dictionary = Dictionary::new(512, true);
        for symbol in 0..=u8::MAX {
            dictionary.insert(symbol, EMPTY);
        }
        for code in NUM_SPECIALS..dictionary.len() as Code {
            let entry = *dictionary.lookup_code(code).unwrap();
            let found = dictionary
                .lookup_extension(entry.symbol(), entry.prefix())
                .unwrap();
            assert_eq!(found.code(), code);
        }
    }

    #[test]
    fn test_fills_to_capacity() {
        let mut dictionary = Dictionary::new(512, false);
        let mut prefix = root(0);
        while !dictionary.is_full() {
            prefix = dictionary.insert(1, prefix).unwrap();
        }
        assert_eq!(dictionary.len(), 512);
        assert_eq!(dictionary.free_slots(), 0);
        assert_eq!(dictionary.chain(511).count(), 253);
    }

    #[test]
    fn test_mark_used() {
        let mut dictionary = Dictionary::new(512, false);
        dictionary.mark_used(root(b'x'), 7);
        assert_eq!(dictionary.lookup_code(root(b'x')).unwrap().last_used(), 7);

        // reserved and unassigned codes are ignored
        dictionary.mark_used(1, 3);
        dictionary.mark_used(4000, 3);
    }

    #[test]
    fn test_prune_keeps_recent_chains() {
        let mut dictionary = Dictionary::new(512, false);
        let ab = dictionary.insert(b'b', root(b'a')).unwrap();
        let abc = dictionary.insert(b'c', ab).unwrap();
        let yx = dictionary.insert(b'x', root(b'y')).unwrap();
        dictionary.mark_used(abc, 5);
        dictionary.mark_used(yx, 1);
        dictionary.mark_used(root(b'q'), 2);

        let pruned = dictionary.prune(3, 6);

        assert_eq!(pruned.len(), 262);
        let new_ab = pruned.lookup_extension(b'b', root(b'a')).unwrap();
        assert_eq!(new_ab.code(), 260);
        assert_eq!(new_ab.last_used(), 0);
        let new_abc = pruned.lookup_extension(b'c', 260).unwrap();
        assert_eq!(new_abc.code(), 261);
        assert_eq!(new_abc.last_used(), 5);
        assert_eq!(spell(&pruned, 261), b"abc");

        assert!(pruned.lookup_extension(b'x', root(b'y')).is_none());

        // single-symbol codes survive with their positions, timestamps reset
        let q = pruned.lookup_extension(b'q', EMPTY).unwrap();
        assert_eq!(q.code(), root(b'q'));
        assert_eq!(q.last_used(), 0);
    }

    #[test]
    fn test_prune_in_escape_mode_evicts_stale_roots() {
        let mut dictionary = Dictionary::new(512, true);
        let a = dictionary.insert(b'a', EMPTY).unwrap();
        let b = dictionary.insert(b'b', EMPTY).unwrap();
        let ac = dictionary.insert(b'c', a).unwrap();
        let z = dictionary.insert(b'z', EMPTY).unwrap();
        dictionary.mark_used(ac, 10);
        dictionary.mark_used(b, 2);
        dictionary.mark_used(z, 9);

        let pruned = dictionary.prune(5, 11);

        assert_eq!(pruned.len(), 7);
        assert_eq!(pruned.lookup_extension(b'a', EMPTY).unwrap().code(), 4);
        assert_eq!(pruned.lookup_extension(b'c', 4).unwrap().code(), 5);
        assert_eq!(pruned.lookup_extension(b'z', EMPTY).unwrap().code(), 6);
        assert!(pruned.lookup_extension(b'b', EMPTY).is_none());
        assert_eq!(spell(&pruned, 5), b"ac");
    }

    #[test]
    fn test_prune_with_nothing_recent() {
        let mut dictionary = Dictionary::new(512, true);
        let a = dictionary.insert(b'a', EMPTY).unwrap();
        dictionary.mark_used(a, 1);

        let pruned = dictionary.prune(1, 10);
        assert_eq!(pruned.len(), NUM_SPECIALS as usize);
        assert_eq!(pruned.capacity(), 512);
        assert!(pruned.escape());
    }

    #[test]
    fn test_prune_full_table_leaves_no_dangling_prefixes() {
        let mut dictionary = Dictionary::new(512, false);
        let mut time = 0;
        let mut prefix = root(b'a');
        while !dictionary.is_full() {
            time += 1;
            let symbol = (time % 7) as u8;
            prefix = dictionary.insert(symbol, prefix).unwrap();
            dictionary.mark_used(prefix, time);
            if time % 5 == 0 {
                prefix = root(symbol);
            }
        }

        let pruned = dictionary.prune(40, time + 1);
        assert!(pruned.len() > 260);
        assert!(pruned.len() < 512);
        for entry in pruned.entries() {
            let last = pruned.chain(entry.code()).last().unwrap();
            assert_eq!(last.prefix(), EMPTY);
            assert!(entry.prefix() < entry.code());
        }
    }
}
