use crate::schema::{Schema, Value};

/// Default page size applied when a non-positive size is requested.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Requested ordering: a field name (optionally `navigation.field`) and
/// direction. An empty field means "by identifier".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub descending: bool,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, descending: bool) -> Self {
        Self {
            field: field.into(),
            descending,
        }
    }

    /// Orders by the identifier field.
    pub fn by_id(descending: bool) -> Self {
        Self::new("", descending)
    }

    /// Resolves the requested field against a schema.
    ///
    /// # Examples
    ///
    /// ```
    /// use inscribe_core::query::{ResolvedSort, SortSpec};
    /// use inscribe_core::schema::{FieldType, Schema};
    ///
    /// struct Item {
    ///     id: i64,
    /// }
    ///
    /// let schema = Schema::builder("Item", "Id", FieldType::Integer, |i: &Item| i.id.into()).build();
    ///
    /// assert_eq!(
    ///     SortSpec::by_id(true).resolve(&schema),
    ///     ResolvedSort::Id { descending: true }
    /// );
    /// assert_eq!(SortSpec::new("Nope", false).resolve(&schema), ResolvedSort::Unsorted);
    /// ```
    pub fn resolve<E>(&self, schema: &Schema<E>) -> ResolvedSort {
        let field = self.field.trim();
        if field.is_empty() {
            return ResolvedSort::Id {
                descending: self.descending,
            };
        }

        match schema.field(field) {
            Some(def) => ResolvedSort::Field {
                name: def.name().to_string(),
                descending: self.descending,
            },
            None => ResolvedSort::Unsorted,
        }
    }
}

/// A sort request after schema resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSort {
    Id { descending: bool },
    Field { name: String, descending: bool },
    /// The requested field does not exist; input order is preserved.
    Unsorted,
}

/// Normalized page request (1-based page number).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub number: u32,
    pub size: u32,
}

impl PageSpec {
    /// Builds a page spec, coercing `number <= 0` to 1 and `size <= 0`
    /// to [`DEFAULT_PAGE_SIZE`].
    ///
    /// ```
    /// use inscribe_core::query::PageSpec;
    ///
    /// assert_eq!(PageSpec::new(0, -5), PageSpec { number: 1, size: 10 });
    /// assert_eq!(PageSpec::new(3, 25).skip(), 50);
    /// ```
    pub fn new(number: i64, size: i64) -> Self {
        let number = if number <= 0 {
            1
        } else {
            u32::try_from(number).unwrap_or(u32::MAX)
        };
        let size = if size <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            u32::try_from(size).unwrap_or(u32::MAX)
        };
        Self { number, size }
    }

    /// Number of items before this page.
    pub fn skip(&self) -> usize {
        (self.number.saturating_sub(1) as usize).saturating_mul(self.size as usize)
    }

    pub fn take(&self) -> usize {
        self.size as usize
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE.into())
    }
}

/// Orders items according to a resolved sort. The sort is stable.
pub fn order_by<E>(items: Vec<E>, schema: &Schema<E>, sort: &ResolvedSort) -> Vec<E> {
    let (def, descending) = match sort {
        ResolvedSort::Unsorted => return items,
        ResolvedSort::Id { descending } => (schema.id_field(), *descending),
        ResolvedSort::Field { name, descending } => match schema.field(name) {
            Some(def) => (def, *descending),
            None => return items,
        },
    };

    let mut keyed: Vec<(Value, E)> = items.into_iter().map(|e| (def.value(&e), e)).collect();
    if descending {
        keyed.sort_by(|(a, _), (b, _)| b.sort_cmp(a));
    } else {
        keyed.sort_by(|(a, _), (b, _)| a.sort_cmp(b));
    }
    keyed.into_iter().map(|(_, e)| e).collect()
}

/// Applies skip/take for the given page.
pub fn paginate<E>(items: Vec<E>, page: PageSpec) -> Vec<E> {
    items
        .into_iter()
        .skip(page.skip())
        .take(page.take())
        .collect()
}
