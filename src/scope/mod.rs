pub mod css;
pub mod html;
pub mod map;
pub mod selector;
pub mod stylesheet;

pub use css::{tag_css, CssParser};
pub use html::{tag_html, HtmlParser};
pub use map::{ScopeBuilder, ScopeMap};
pub use selector::ScopeSelector;
pub use stylesheet::tag_stylesheet;
