//! Header matching rules for mapping sheet columns onto typed fields

use super::sheet::{CellValue, SheetRow};

/// Maps any header containing `pattern` to `field`
#[derive(Debug, Clone, Copy)]
pub struct ColumnRule<F: 'static> {
    pub pattern: &'static str,
    pub field: F,
}

/// Ordered rules; the first rule whose pattern occurs in a header wins
#[derive(Debug, Clone, Copy)]
pub struct RuleSet<F: 'static> {
    rules: &'static [ColumnRule<F>],
}

impl<F: Copy> RuleSet<F> {
    pub const fn new(rules: &'static [ColumnRule<F>]) -> Self {
        Self { rules }
    }

    pub fn match_column(&self, header: &str) -> Option<F> {
        self.rules
            .iter()
            .find(|rule| header.contains(rule.pattern))
            .map(|rule| rule.field)
    }

    /// Matched `(field, value)` pairs of a row, in column order
    pub fn apply<'r>(self, row: &'r SheetRow) -> impl Iterator<Item = (F, &'r CellValue)> + 'r {
        row.iter().filter_map(move |(header, value)| {
            self.match_column(header).map(|field| (field, value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Field {
        Reason,
        ReasonCategory,
        Name,
    }

    const RULES: RuleSet<Field> = RuleSet::new(&[
        ColumnRule { pattern: "原因类别", field: Field::ReasonCategory },
        ColumnRule { pattern: "原因", field: Field::Reason },
        ColumnRule { pattern: "简称", field: Field::Name },
    ]);

    #[test]
    fn test_substring_match() {
        assert_eq!(RULES.match_column("股票简称"), Some(Field::Name));
        assert_eq!(RULES.match_column("涨停原因[20240105]"), Some(Field::Reason));
        assert_eq!(RULES.match_column("代码"), None);
    }

    #[test]
    fn test_first_rule_wins() {
        assert_eq!(
            RULES.match_column("涨停原因类别"),
            Some(Field::ReasonCategory)
        );
    }

    #[test]
    fn test_apply_keeps_column_order() {
        let row = SheetRow::from_pairs([
            ("股票简称", CellValue::Text("平安银行".into())),
            ("代码", CellValue::Text("000001".into())),
            ("涨停原因", CellValue::Text("金融".into())),
        ]);

        let matched: Vec<Field> = RULES.apply(&row).map(|(f, _)| f).collect();
        assert_eq!(matched, vec![Field::Name, Field::Reason]);
    }
}
