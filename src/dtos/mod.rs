pub mod alertdtos;
pub mod chatdtos;
pub mod otpdtos;
pub mod reportdtos;
pub mod userdtos;

pub use alertdtos::*;
pub use chatdtos::*;
pub use otpdtos::*;
pub use reportdtos::*;
pub use userdtos::*;
