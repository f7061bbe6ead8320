// SPDX-FileCopyrightText: 2025 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use itertools::Itertools;
use std::collections::HashMap;
use std::fmt;

const PAGE_SIZE: usize = 512;
const PAGE_MASK: u64 = PAGE_SIZE as u64 - 1;

static EMPTY: [i64; PAGE_SIZE] = [0; PAGE_SIZE];

macro_rules! page_index {
    ($i: expr) => {{
        #[allow(clippy::cast_possible_truncation, reason = "masked down anyway")]
        {
            ($i & PAGE_MASK) as usize
        }
    }};
}

/// Sparse, paged Intcode memory. Every address that was never written reads as `0`.
///
/// Pages are only allocated when written to, so programs can address memory far beyond their
/// initial image without cost.
pub struct Memory {
    pages: HashMap<u64, Box<[i64; PAGE_SIZE]>>,
}

impl Memory {
    const fn page_number(address: u64) -> u64 {
        address & !PAGE_MASK
    }

    fn page(&self, page_number: u64) -> &[i64; PAGE_SIZE] {
        self.pages.get(&page_number).map_or(&EMPTY, |p| p.as_ref())
    }

    /// Read the value at `address`
    pub fn get(&self, address: u64) -> i64 {
        self.page(Self::page_number(address))[page_index!(address)]
    }

    /// Write `value` to `address`, allocating its page if needed. Writing `0` to an unallocated
    /// page is a no-op.
    pub(crate) fn set(&mut self, address: u64, value: i64) {
        if value == 0 && !self.pages.contains_key(&Self::page_number(address)) {
            return;
        }
        self[address] = value;
    }

    /// One past the highest address holding a non-zero value
    pub fn extent(&self) -> u64 {
        self.pages
            .iter()
            .filter_map(|(&n, page)| {
                page.iter()
                    .rposition(|&v| v != 0)
                    .map(|i| n + i as u64 + 1)
            })
            .max()
            .unwrap_or_default()
    }

    /// Copy the addresses `0..extent()` into a [Vec]
    pub fn to_vec(&self) -> Vec<i64> {
        (0..self.extent()).map(|address| self.get(address)).collect()
    }
}

impl PartialEq for Memory {
    fn eq(&self, other: &Self) -> bool {
        self.pages.iter().all(|(&n, p)| other.page(n) == p.as_ref())
            && other.pages.iter().all(|(&n, p)| self.page(n) == p.as_ref())
    }
}

impl Eq for Memory {}

impl FromIterator<i64> for Memory {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let iter = iter.into_iter();

        let mut pages = HashMap::with_capacity(iter.size_hint().0.div_ceil(PAGE_SIZE));

        for (page_number, chunk) in (0..).step_by(PAGE_SIZE).zip(&iter.chunks(PAGE_SIZE)) {
            let mut page = Box::new([0; PAGE_SIZE]);
            for (slot, value) in page.iter_mut().zip(chunk) {
                *slot = value;
            }
            if page[..] != EMPTY {
                pages.insert(page_number, page);
            }
        }

        Self { pages }
    }
}

impl std::ops::Index<u64> for Memory {
    type Output = i64;
    fn index(&self, i: u64) -> &i64 {
        self.pages
            .get(&Self::page_number(i))
            .map_or(&0, |p| p.index(page_index!(i)))
    }
}

impl std::ops::IndexMut<u64> for Memory {
    fn index_mut(&mut self, i: u64) -> &mut i64 {
        self.pages
            .entry(Self::page_number(i))
            .or_insert_with(|| Box::new([0; PAGE_SIZE]))
            .index_mut(page_index!(i))
    }
}

impl Clone for Memory {
    fn clone(&self) -> Self {
        // don't copy blank pages
        let pages = self
            .pages
            .iter()
            .filter(|&(_, page)| page.as_ref() != &EMPTY)
            .map(|(&n, page)| (n, page.clone()))
            .collect();
        Self { pages }
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fmtstruct = fmt.debug_map();
        for n in self.pages.keys().sorted_unstable() {
            if self.pages[n].as_ref() != &EMPTY {
                fmtstruct.entry(
                    &format_args!("{{ page 0x{n:04x} }}"),
                    &format_args!("{:?}", self.pages[n]),
                );
            }
        }
        fmtstruct.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_reads_zero() {
        let mem: Memory = [1, 2, 3].into_iter().collect();
        assert_eq!(mem[2], 3);
        assert_eq!(mem[3], 0);
        assert_eq!(mem.get(u64::MAX), 0);
        assert_eq!(mem.pages.len(), 1);
    }

    #[test]
    fn writes_across_pages() {
        let mut mem: Memory = std::iter::empty().collect();
        mem[1_000_000] = 7;
        mem.set(511, -1);
        mem.set(4096, 0);
        assert_eq!(mem.get(1_000_000), 7);
        assert_eq!(mem[511], -1);
        assert_eq!(mem.pages.len(), 2);
        assert_eq!(mem.extent(), 1_000_001);
    }

    #[test]
    fn equality_ignores_blank_pages() {
        let a: Memory = [5, 0, 9].into_iter().collect();
        let mut b = a.clone();
        b[10_000] = 1;
        assert_ne!(a, b);
        b[10_000] = 0;
        assert_eq!(a, b);
        assert_eq!(b.pages.len(), 2);
        assert_eq!(b.clone().pages.len(), 1);
        assert_eq!(b.to_vec(), vec![5, 0, 9]);
    }

    #[test]
    fn large_image() {
        let image: Vec<i64> = (1..=1500).collect();
        let mem: Memory = image.iter().copied().collect();
        assert_eq!(mem.pages.len(), 3);
        assert_eq!(mem.to_vec(), image);
    }
}
