/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderBy {
    #[default]
    Asc,
    Desc,
}

impl OrderBy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Asc => "asc",
            OrderBy::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub field: String,
    pub direction: OrderBy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupBySpec {
    pub field: String,
}
