/// Shape Module
///
/// A shape is the statically registered structure of a row-mapped type: how
/// to make an empty value, and an ordered table of `(column name, field
/// assigner)` pairs. Tables are built once per type and reused by every query.
///
/// ## Column matching
///
/// - Column labels match field names ASCII case-insensitively and exactly.
/// - Columns without a matching field are ignored.
/// - Fields without a matching column keep their default value.
/// - When two columns match the same field they are assigned in column order,
///   so the right-most one wins.
/// - Nested shapes are not supported. NULL only maps into `Option<_>` fields.
use rusqlite::Row;

/// Writes column `index` of `row` into one field of `T`.
pub type FieldAssign<T> = fn(&mut T, &Row<'_>, usize) -> rusqlite::Result<()>;

/// One `(column name, assigner)` pair of a shape.
pub struct FieldBinding<T> {
    name: &'static str,
    assign: FieldAssign<T>,
}

impl<T> FieldBinding<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn assign(&self, target: &mut T, row: &Row<'_>, index: usize) -> rusqlite::Result<()> {
        (self.assign)(target, row, index)
    }
}

/// The registered structure of a row-mapped type.
pub struct ShapeDescriptor<T> {
    make: fn() -> T,
    fields: Vec<FieldBinding<T>>,
}

impl<T> ShapeDescriptor<T> {
    /// Starts an empty table whose values are created with `make`.
    pub fn new(make: fn() -> T) -> Self {
        ShapeDescriptor {
            make,
            fields: Vec::new(),
        }
    }

    /// Registers `name` as the column feeding a field.
    ///
    /// Registering a name that is already present (ignoring ASCII case)
    /// replaces the earlier assigner in place.
    pub fn field(mut self, name: &'static str, assign: FieldAssign<T>) -> Self {
        match self
            .fields
            .iter_mut()
            .find(|existing| existing.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => *existing = FieldBinding { name, assign },
            None => self.fields.push(FieldBinding { name, assign }),
        }
        self
    }

    /// The registered fields, in registration order.
    pub fn fields(&self) -> &[FieldBinding<T>] {
        &self.fields
    }

    pub(crate) fn make(&self) -> T {
        (self.make)()
    }

    /// Resolves a result's column labels against the table.
    ///
    /// Returns `(column index, field)` pairs in column order; unmatched
    /// columns are left out.
    pub fn plan<'s, S: AsRef<str>>(&'s self, columns: &[S]) -> Vec<(usize, &'s FieldBinding<T>)> {
        columns
            .iter()
            .enumerate()
            .filter_map(|(index, column)| {
                self.fields
                    .iter()
                    .find(|field| field.name.eq_ignore_ascii_case(column.as_ref()))
                    .map(|field| (index, field))
            })
            .collect()
    }
}

/// A type with a registered [`ShapeDescriptor`].
///
/// Usually implemented with the [`shape!`](crate::shape) macro.
pub trait Shape: Sized + 'static {
    fn descriptor() -> &'static ShapeDescriptor<Self>;
}

/// Registers a struct's named fields as its column table.
///
/// The struct must implement `Default`; every listed field must implement
/// `rusqlite::types::FromSql`. That includes `chrono` date/time types and
/// `serde_json::Value`.
///
/// ```
/// #[derive(Debug, Default)]
/// struct User {
///     id: i64,
///     name: String,
///     email: Option<String>,
/// }
///
/// sqltemplate::shape!(User { id, name, email });
/// ```
#[macro_export]
macro_rules! shape {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::Shape for $ty {
            fn descriptor() -> &'static $crate::ShapeDescriptor<Self> {
                static DESCRIPTOR: $crate::__private::Lazy<$crate::ShapeDescriptor<$ty>> =
                    $crate::__private::Lazy::new(|| {
                        $crate::ShapeDescriptor::new(<$ty as ::std::default::Default>::default)
                            $(.field(::std::stringify!($field), |target, row, index| {
                                target.$field = row.get(index)?;
                                Ok(())
                            }))+
                    });
                &DESCRIPTOR
            }
        }
    };
}
