/// One page of results together with the total row count of the unpaged query
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub offset: u64,
    pub limit: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit)
    }

    /// Zero-based index of this page
    pub fn index(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.offset / self.limit
    }

    pub fn has_next(&self) -> bool {
        self.offset.saturating_add(self.limit) < self.total
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            offset: self.offset,
            limit: self.limit,
            total: self.total,
        }
    }
}
