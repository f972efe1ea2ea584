pub mod hierarchical;
