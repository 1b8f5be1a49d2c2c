/// Extraction Module
///
/// Drives a row cursor through one of the two extraction strategies and
/// materializes the whole result before returning, since the cursor has to be
/// released before the caller sees any value.
use crate::core::db::rule::ExtractionRule;
use crate::core::db::shape::{Shape, ShapeDescriptor};
use rusqlite::Rows;

/// The extraction strategy selected at the call site.
pub enum Extractor<'a, T> {
    /// Map columns onto fields by name through a registered shape.
    Reflective(&'a ShapeDescriptor<T>),
    /// Hand each row to a caller-supplied rule.
    Manual(&'a ExtractionRule<T>),
}

impl<'a, T> Clone for Extractor<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Extractor<'a, T> {}

impl<'a, T> From<&'a ShapeDescriptor<T>> for Extractor<'a, T> {
    fn from(descriptor: &'a ShapeDescriptor<T>) -> Self {
        Extractor::Reflective(descriptor)
    }
}

impl<'a, T> From<&'a ExtractionRule<T>> for Extractor<'a, T> {
    fn from(rule: &'a ExtractionRule<T>) -> Self {
        Extractor::Manual(rule)
    }
}

impl<T: Shape> Extractor<'static, T> {
    /// Reflective extraction through `T`'s registered shape.
    pub fn shape() -> Self {
        Extractor::Reflective(T::descriptor())
    }
}

impl<'a, T> Extractor<'a, T> {
    /// Drains `rows` into values, one per row, in cursor order.
    ///
    /// Stops at the first failing row; values extracted before it are dropped.
    pub fn extract(&self, rows: &mut Rows<'_>) -> rusqlite::Result<Vec<T>> {
        match *self {
            Extractor::Reflective(descriptor) => extract_reflective(descriptor, rows),
            Extractor::Manual(rule) => extract_manual(rule, rows),
        }
    }
}

fn extract_reflective<T>(descriptor: &ShapeDescriptor<T>, rows: &mut Rows<'_>) -> rusqlite::Result<Vec<T>> {
    let plan = match rows.as_ref() {
        Some(stmt) => descriptor.plan(&stmt.column_names()),
        None => Vec::new(),
    };

    let mut values = Vec::new();
    while let Some(row) = rows.next()? {
        let mut value = descriptor.make();
        for (index, field) in &plan {
            field.assign(&mut value, row, *index)?;
        }
        values.push(value);
    }
    Ok(values)
}

fn extract_manual<T>(rule: &ExtractionRule<T>, rows: &mut Rows<'_>) -> rusqlite::Result<Vec<T>> {
    let mut values = Vec::new();
    while let Some(row) = rows.next()? {
        values.push(rule.apply(row)?);
    }
    Ok(values)
}
