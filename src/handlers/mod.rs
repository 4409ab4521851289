// Public: `/` and `/health`. Protected by HTTP Basic: everything under `/cashcards`.
pub mod cashcards;
pub mod system;
