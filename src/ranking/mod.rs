pub mod ranker;
