//! Id-to-category index shared by catalog implementations

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::image::{CategoryKey, ImageIdentity};

#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    by_image: BTreeMap<ImageIdentity, CategoryKey>,
    by_category: BTreeMap<CategoryKey, BTreeSet<ImageIdentity>>,
}

impl CategoryIndex {
    pub fn insert(&mut self, id: ImageIdentity, category: CategoryKey) {
        if let Some(previous) = self.by_image.insert(id.clone(), category.clone()) {
            if let Some(ids) = self.by_category.get_mut(&previous) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.by_category.remove(&previous);
                }
            }
        }
        self.by_category.entry(category).or_default().insert(id);
    }

    pub fn category_of(&self, id: &ImageIdentity) -> Option<&CategoryKey> {
        self.by_image.get(id)
    }

    pub fn categories(&self) -> Vec<CategoryKey> {
        self.by_category.keys().cloned().collect()
    }

    pub fn images_in(&self, category: &CategoryKey) -> Vec<ImageIdentity> {
        self.by_category
            .get(category)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_image.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_image.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reassigning_moves_image() {
        let hats = CategoryKey::new("shop", "hats");
        let shoes = CategoryKey::new("shop", "shoes");
        let id = ImageIdentity::from_parts(1, 1);

        let mut index = CategoryIndex::default();
        index.insert(id.clone(), hats.clone());
        index.insert(id.clone(), shoes.clone());

        assert_eq!(index.category_of(&id), Some(&shoes));
        assert!(index.images_in(&hats).is_empty());
        assert_eq!(index.categories(), vec![shoes]);
        assert_eq!(index.len(), 1);
    }
}
