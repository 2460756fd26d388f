pub mod employee;

pub mod prelude {
    pub use crate::employee::Entity as Employee;
}
