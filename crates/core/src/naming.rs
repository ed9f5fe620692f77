//! Column name generation.
//!
//! Every function here is pure: the same mapping name, instance index,
//! parent context and format always render the same column name. Indices
//! are passed 0-based and rendered 1-based.

use serde::{Deserialize, Serialize};

/// How a column name is rendered for one instance of a mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InlineFormat {
    /// `name`
    NoCounts,
    /// `name_<index>`
    #[default]
    WithCount,
    /// `<parent>_<parent index>_name_<index>`, falling back to
    /// `WithCount` when there is no parent context.
    WithParentCount,
    /// A template using `{name}`, `{index}`, `{parent}` and
    /// `{parent_index}` placeholders. Without a parent context the parent
    /// placeholders render empty.
    Custom(String),
}

/// The enclosing instance a column belongs to, when an inline container
/// lays its instances out side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentContext<'a> {
    pub name: &'a str,
    pub index: usize,
}

impl<'a> ParentContext<'a> {
    pub fn new(name: &'a str, index: usize) -> Self {
        Self { name, index }
    }
}

pub fn column_name(
    name: &str,
    index: usize,
    parent: Option<ParentContext<'_>>,
    format: &InlineFormat,
) -> String {
    match (format, parent) {
        (InlineFormat::NoCounts, _) => name.to_string(),
        (InlineFormat::WithCount, _) | (InlineFormat::WithParentCount, None) => {
            format!("{}_{}", name, index + 1)
        }
        (InlineFormat::WithParentCount, Some(p)) => {
            format!("{}_{}_{}_{}", p.name, p.index + 1, name, index + 1)
        }
        (InlineFormat::Custom(template), parent) => {
            let (parent_name, parent_index) = match parent {
                Some(p) => (p.name.to_string(), (p.index + 1).to_string()),
                None => (String::new(), String::new()),
            };
            template
                .replace("{name}", name)
                .replace("{index}", &(index + 1).to_string())
                .replace("{parent_index}", &parent_index)
                .replace("{parent}", &parent_name)
        }
    }
}

/// The formats a value mapping uses for one instance and for many.
///
/// A mapping without an explicit format renders a lone column as its bare
/// name and only numbers columns once there are several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFormat {
    pub single: InlineFormat,
    pub multiple: InlineFormat,
}

impl ColumnFormat {
    pub fn fixed(format: InlineFormat) -> Self {
        Self {
            single: format.clone(),
            multiple: format,
        }
    }

    pub fn for_count(&self, count: usize) -> &InlineFormat {
        if count == 1 { &self.single } else { &self.multiple }
    }

    /// Names for `count` side-by-side instances of `name`.
    pub fn column_names(
        &self,
        name: &str,
        count: usize,
        parent: Option<ParentContext<'_>>,
    ) -> Vec<String> {
        let format = self.for_count(count);
        (0..count).map(|i| column_name(name, i, parent, format)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_formats() {
        let parent = Some(ParentContext::new("Members", 1));
        assert_eq!(column_name("Age", 0, parent, &InlineFormat::NoCounts), "Age");
        assert_eq!(column_name("Age", 2, parent, &InlineFormat::WithCount), "Age_3");
        assert_eq!(
            column_name("Age", 0, parent, &InlineFormat::WithParentCount),
            "Members_2_Age_1"
        );
        assert_eq!(column_name("Age", 0, None, &InlineFormat::WithParentCount), "Age_1");
    }

    #[test]
    fn test_custom_template() {
        let format = InlineFormat::Custom("{parent}[{parent_index}].{name}[{index}]".into());
        let parent = Some(ParentContext::new("Line", 0));
        assert_eq!(column_name("Sku", 1, parent, &format), "Line[1].Sku[2]");
        assert_eq!(column_name("Sku", 1, None, &format), "[].Sku[2]");
    }

    #[test]
    fn test_naming_is_pure() {
        let formats = [
            InlineFormat::NoCounts,
            InlineFormat::WithCount,
            InlineFormat::WithParentCount,
            InlineFormat::Custom("{name}-{index}".into()),
        ];
        for format in &formats {
            for index in 0..3 {
                let parent = Some(ParentContext::new("P", index));
                assert_eq!(
                    column_name("Name", index, parent, format),
                    column_name("Name", index, parent, format)
                );
            }
        }
    }

    #[test]
    fn test_default_column_format_numbers_only_multiple_instances() {
        let format = ColumnFormat {
            single: InlineFormat::NoCounts,
            multiple: InlineFormat::WithCount,
        };
        assert_eq!(format.column_names("Age", 1, None), ["Age"]);
        assert_eq!(format.column_names("Age", 3, None), ["Age_1", "Age_2", "Age_3"]);
        assert!(format.column_names("Age", 0, None).is_empty());
    }
}
