use alloc::vec;
use alloc::vec::Vec;

/// 位图的一组
type BitGroup = u64;
const GROUP_BITS: usize = BitGroup::BITS as usize;

/// 分配状态位图，记录一张定长表里每个槽位是否被占用
#[derive(Debug)]
pub struct Bitmap {
    groups: Vec<BitGroup>,
    /// 槽位总数，最后一组中超出它的位永不分配
    capacity: usize,
}

/// 槽位编号
struct SlotId(usize);

impl Bitmap {
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self {
            groups: vec![0; capacity.div_ceil(GROUP_BITS)],
            capacity,
        }
    }

    /// 分配编号最小的空闲槽位。若槽位用尽，则返回空。
    pub fn alloc(&mut self) -> Option<usize> {
        // 寻找还有0的组，组内最低位的0即为最小的空闲槽位
        let (group_index, ingroup_index) =
            self.groups
                .iter()
                .enumerate()
                .find_map(|(group_index, &bits)| {
                    (bits != BitGroup::MAX).then_some((group_index, bits.trailing_ones()))
                })?;

        let slot = SlotId::encode(group_index, ingroup_index as usize);
        if slot >= self.capacity {
            return None;
        }

        self.groups[group_index] |= 1 << ingroup_index;
        Some(slot)
    }

    pub fn dealloc(&mut self, slot: usize) {
        let (group_index, ingroup_index) = SlotId(slot).decode();

        // 编号一定得有对应的位
        assert_ne!(
            self.groups[group_index] & (1 << ingroup_index),
            0,
            "slot {slot} freed twice"
        );

        self.groups[group_index] &= !(1 << ingroup_index);
    }

    pub fn is_taken(&self, slot: usize) -> bool {
        if slot >= self.capacity {
            return false;
        }
        let (group_index, ingroup_index) = SlotId(slot).decode();
        self.groups[group_index] & (1 << ingroup_index) != 0
    }

    /// 已占用的槽位数
    pub fn taken(&self) -> usize {
        self.groups.iter().map(|bits| bits.count_ones() as usize).sum()
    }
}

impl SlotId {
    #[inline]
    fn encode(group_index: usize, ingroup_index: usize) -> usize {
        group_index * GROUP_BITS + ingroup_index
    }

    #[inline]
    fn decode(self) -> (usize, usize) {
        (self.0 / GROUP_BITS, self.0 % GROUP_BITS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_until_full() {
        let mut bitmap = Bitmap::new(70);
        for expected in 0..70 {
            assert_eq!(bitmap.alloc(), Some(expected));
        }
        assert_eq!(bitmap.alloc(), None);
        assert_eq!(bitmap.taken(), 70);
    }

    #[test]
    fn reuses_lowest_free() {
        let mut bitmap = Bitmap::new(8);
        (0..8).for_each(|_| {
            bitmap.alloc();
        });
        bitmap.dealloc(5);
        bitmap.dealloc(2);
        assert!(!bitmap.is_taken(2));
        assert_eq!(bitmap.alloc(), Some(2));
        assert_eq!(bitmap.alloc(), Some(5));
        assert_eq!(bitmap.alloc(), None);
    }

    #[test]
    fn out_of_range_is_free() {
        let bitmap = Bitmap::new(3);
        assert!(!bitmap.is_taken(3));
        assert!(!bitmap.is_taken(1000));
    }

    #[test]
    #[should_panic]
    fn double_free_panics() {
        let mut bitmap = Bitmap::new(4);
        let slot = bitmap.alloc().unwrap();
        bitmap.dealloc(slot);
        bitmap.dealloc(slot);
    }
}
