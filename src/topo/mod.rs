pub mod fat_tree;
