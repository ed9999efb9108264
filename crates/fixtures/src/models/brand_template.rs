use elif_factory::prelude::*;
use serde::{Deserialize, Serialize};

use super::user::UserFactory;

const FONT_FAMILIES: &[&str] = &[
    "Inter",
    "Roboto",
    "Open Sans",
    "Lato",
    "Montserrat",
    "Poppins",
    "Source Sans Pro",
];

const LAYOUTS: &[&str] = &["grid", "stacked", "split", "centered"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    SocialMedia,
    Email,
    Presentation,
    Print,
    Web,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrandTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub user_id: RecordId,
    pub name: String,
    pub category: TemplateCategory,
    pub primary_color: String,
    pub secondary_color: String,
    pub font_family: String,
    pub logo_url: Option<String>,
    pub settings: JsonValue,
    pub is_default: bool,
    pub is_active: bool,
    pub usage_count: u32,
}

impl_has_id!(BrandTemplate);

#[derive(Debug, Clone, Default)]
pub struct BrandTemplateFactory {
    builder: FactoryBuilder<BrandTemplate>,
}

impl BrandTemplateFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's default template; a default template is always active
    pub fn default_template(self) -> Self {
        self.state(default_template())
    }

    pub fn inactive(self) -> Self {
        self.state(inactive())
    }

    pub fn popular(self) -> Self {
        self.state(popular())
    }
}

fn default_template() -> State<BrandTemplate> {
    State::new("default", |template: &mut BrandTemplate, _ctx: &mut FactoryContext<'_>| {
        template.is_default = true;
        template.is_active = true;
        Ok(())
    })
}

fn inactive() -> State<BrandTemplate> {
    State::new("inactive", |template: &mut BrandTemplate, _ctx: &mut FactoryContext<'_>| {
        template.is_active = false;
        template.is_default = false;
        Ok(())
    })
}

fn popular() -> State<BrandTemplate> {
    State::new("popular", |template: &mut BrandTemplate, ctx: &mut FactoryContext<'_>| {
        template.usage_count = ctx.rng().int_between(500, 5_000) as u32;
        Ok(())
    })
}

impl Factory for BrandTemplateFactory {
    type Model = BrandTemplate;
    const KIND: &'static str = "BrandTemplate";

    fn builder(&self) -> &FactoryBuilder<BrandTemplate> {
        &self.builder
    }

    fn builder_mut(&mut self) -> &mut FactoryBuilder<BrandTemplate> {
        &mut self.builder
    }

    fn definition(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<BrandTemplate> {
        let user_id = ctx.foreign_key("user_id", UserFactory::new())?;

        let rng = ctx.rng();
        let settings = json!({
            "layout": *rng.element(LAYOUTS),
            "border_radius": rng.int_between(0, 16),
            "show_logo": rng.chance(0.5),
        });

        Ok(BrandTemplate {
            id: None,
            user_id,
            name: format!("{} {}", rng.company_name(), rng.word()),
            category: *rng.element(&[
                TemplateCategory::SocialMedia,
                TemplateCategory::Email,
                TemplateCategory::Presentation,
                TemplateCategory::Print,
                TemplateCategory::Web,
            ]),
            primary_color: rng.hex_color(),
            secondary_color: rng.hex_color(),
            font_family: rng.element(FONT_FAMILIES).to_string(),
            logo_url: rng.optional(0.6, |r| {
                format!("https://cdn.example.com/logos/{}.png", r.token(12).to_lowercase())
            }),
            settings,
            is_default: rng.chance(0.1),
            is_active: rng.chance(0.9),
            usage_count: rng.int_between(0, 100) as u32,
        })
    }

    fn named_state(name: &str, _params: &StateParams) -> FactoryResult<State<BrandTemplate>> {
        match name {
            "default" => Ok(default_template()),
            "inactive" => Ok(inactive()),
            "popular" => Ok(popular()),
            other => Err(FactoryError::unknown_override(Self::KIND, other)),
        }
    }

    fn state_names() -> &'static [&'static str] {
        &["default", "inactive", "popular"]
    }
}
