//! Naming helpers for descriptors and template variables

use convert_case::{Case, Casing};

/// Words whose plural does not follow the suffix rules
const IRREGULAR: &[(&str, &str)] = &[
	("child", "children"),
	("person", "people"),
	("man", "men"),
	("woman", "women"),
	("mouse", "mice"),
	("goose", "geese"),
	("foot", "feet"),
	("tooth", "teeth"),
	("ox", "oxen"),
	("leaf", "leaves"),
	("life", "lives"),
	("knife", "knives"),
	("wife", "wives"),
	("half", "halves"),
	("criterion", "criteria"),
	("datum", "data"),
	("medium", "media"),
	("index", "indices"),
	("matrix", "matrices"),
	("vertex", "vertices"),
];

/// Words that are the same in singular and plural
const UNCOUNTABLE: &[&str] = &[
	"equipment",
	"information",
	"rice",
	"money",
	"species",
	"series",
	"fish",
	"sheep",
	"news",
	"media",
	"data",
	"metadata",
	"feedback",
];

/// Pluralize the last word of a snake_case identifier
///
/// # Examples
///
/// ```
/// use admin_crud_core::inflector::pluralize;
///
/// assert_eq!(pluralize("category"), "categories");
/// assert_eq!(pluralize("blog_post"), "blog_posts");
/// assert_eq!(pluralize("status"), "statuses");
/// ```
pub fn pluralize(word: &str) -> String {
	let (head, last) = match word.rfind('_') {
		Some(pos) => word.split_at(pos + 1),
		None => ("", word),
	};
	if last.is_empty() {
		return word.to_string();
	}
	format!("{}{}", head, pluralize_word(last))
}

fn pluralize_word(word: &str) -> String {
	let lower = word.to_lowercase();

	if UNCOUNTABLE.contains(&lower.as_str()) {
		return word.to_string();
	}
	if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
		return keep_leading_case(word, plural);
	}

	let chars: Vec<char> = lower.chars().collect();
	let penultimate = chars.len().checked_sub(2).map(|i| chars[i]);
	let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u');

	if lower.ends_with('y') && penultimate.is_some_and(|c| !is_vowel(c)) {
		return format!("{}ies", &word[..word.len() - 1]);
	}
	if lower.ends_with("ss")
		|| lower.ends_with("us")
		|| lower.ends_with("sh")
		|| lower.ends_with("ch")
		|| lower.ends_with('x')
		|| lower.ends_with('z')
	{
		return format!("{}es", word);
	}
	if lower.ends_with('s') {
		// Already plural ("news" is handled above)
		return word.to_string();
	}
	format!("{}s", word)
}

fn keep_leading_case(original: &str, replacement: &str) -> String {
	match original.chars().next() {
		Some(first) if first.is_uppercase() => replacement.to_case(Case::Pascal),
		_ => replacement.to_string(),
	}
}

/// Lower camel case form used for template variable names
///
/// ```
/// use admin_crud_core::inflector::variable;
///
/// assert_eq!(variable("parent_categories"), "parentCategories");
/// ```
pub fn variable(word: &str) -> String {
	word.to_case(Case::Camel)
}

/// Upper camel case form used for model and plugin names
///
/// ```
/// use admin_crud_core::inflector::camelize;
///
/// assert_eq!(camelize("blog_post"), "BlogPost");
/// assert_eq!(camelize("BlogPost"), "BlogPost");
/// ```
pub fn camelize(word: &str) -> String {
	word.to_case(Case::Pascal)
}

/// snake_case form used for URL slugs
pub fn underscore(word: &str) -> String {
	word.to_case(Case::Snake)
}

/// Human readable lower-case name (`BlogPost` → `blog post`)
pub fn humanize(word: &str) -> String {
	word.to_case(Case::Lower)
}

/// Template variable holding the option list for a belongs-to foreign key
///
/// Strips a trailing `_id`, pluralizes the remainder and camel-cases it.
///
/// ```
/// use admin_crud_core::inflector::option_list_variable;
///
/// assert_eq!(option_list_variable("category_id"), "categories");
/// assert_eq!(option_list_variable("parent_blog_post_id"), "parentBlogPosts");
/// ```
pub fn option_list_variable(foreign_key: &str) -> String {
	let base = foreign_key.strip_suffix("_id").unwrap_or(foreign_key);
	variable(&pluralize(base))
}
