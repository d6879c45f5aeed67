use glam::DVec3;

/// An axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner of the box.
    pub min: DVec3,
    /// Maximum corner of the box.
    pub max: DVec3,
}

impl Default for BoundingBox {
    #[inline]
    fn default() -> Self {
        Self::new(DVec3::INFINITY, DVec3::NEG_INFINITY)
    }
}

impl BoundingBox {
    /// Creates a new [`BoundingBox`] with the given min and max corners.
    #[inline]
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Extends the [`BoundingBox`] so that it contains the given position.
    #[inline]
    pub fn extend(&mut self, position: DVec3) {
        self.min = self.min.min(position);
        self.max = self.max.max(position);
    }

    /// Creates a new [`BoundingBox`] that contains the given positions.
    #[inline]
    pub fn containing<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = DVec3>,
    {
        let mut result = Self::default();
        for position in positions {
            result.extend(position);
        }
        result
    }

    /// Returns the size of the [`BoundingBox`].
    #[inline]
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Returns the axis of greatest extent, ties broken towards the lower axis
    /// (x before y before z).
    #[inline]
    pub fn widest_axis(&self) -> usize {
        let size = self.size();

        let mut axis = 0;
        for dim in 1..3 {
            if size[dim] > size[axis] {
                axis = dim;
            }
        }
        axis
    }
}

/// Reorders `indices` in place so that the element at `nth` is the one that would be
/// there if the slice were sorted by `key`, with every element before it comparing
/// less than or equal and every element after it greater than or equal.
///
/// Quickselect with a median-of-three pivot and a three-way partition, running in
/// expected linear time. Duplicate keys fall in the pivot's equal band, so an
/// all-equal range finishes in a single pass.
pub fn select_nth_by_key<F>(indices: &mut [usize], nth: usize, key: F)
where
    F: Fn(usize) -> f64,
{
    debug_assert!(nth < indices.len());

    let mut left = 0;
    let mut right = indices.len();

    while right - left > 1 {
        let pivot = key(indices[median_of_three(indices, left, right, &key)]);

        // Three-way partition of [left, right) into [left, lt) < pivot,
        // [lt, gt) == pivot and [gt, right) > pivot.
        let mut lt = left;
        let mut gt = right;
        let mut i = left;
        while i < gt {
            let k = key(indices[i]);
            if k < pivot {
                indices.swap(lt, i);
                lt += 1;
                i += 1;
            } else if k > pivot {
                gt -= 1;
                indices.swap(i, gt);
            } else {
                i += 1;
            }
        }

        if nth < lt {
            right = lt;
        } else if nth < gt {
            return;
        } else {
            left = gt;
        }
    }
}

/// Index of the element with the median key among the first, middle and last elements
/// of `[left, right)`.
fn median_of_three<F>(indices: &[usize], left: usize, right: usize, key: &F) -> usize
where
    F: Fn(usize) -> f64,
{
    let a = left;
    let b = left + (right - left) / 2;
    let c = right - 1;

    let (ka, kb, kc) = (key(indices[a]), key(indices[b]), key(indices[c]));
    if ka <= kb {
        if kb <= kc {
            b
        } else if ka <= kc {
            c
        } else {
            a
        }
    } else if ka <= kc {
        a
    } else if kb <= kc {
        c
    } else {
        b
    }
}
