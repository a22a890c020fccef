use std::collections::HashMap;

use crate::post::Post;

#[derive(Debug, Default)]
pub struct Taxonomy {
    tags: HashMap<String, usize>,
    categories: HashMap<String, usize>,
}

impl Taxonomy {
    pub fn from_posts<'a>(posts: impl IntoIterator<Item = &'a Post>) -> Taxonomy {
        let mut taxonomy = Taxonomy::default();
        for post in posts {
            for tag in post.front_matter.tags() {
                *taxonomy.tags.entry(tag.clone()).or_insert(0) += 1;
            }
            for category in post.front_matter.categories() {
                *taxonomy.categories.entry(category.clone()).or_insert(0) += 1;
            }
        }
        taxonomy
    }

    pub fn sorted_tags(&self) -> Vec<(String, usize)> {
        Self::sorted(&self.tags)
    }

    pub fn sorted_categories(&self) -> Vec<(String, usize)> {
        Self::sorted(&self.categories)
    }

    // Most used first, ties by name
    fn sorted(counts: &HashMap<String, usize>) -> Vec<(String, usize)> {
        let mut list: Vec<(String, usize)> = counts.iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        list.sort_by(|(ka, va), (kb, vb)| vb.cmp(va).then_with(|| ka.cmp(kb)));
        list
    }
}
