use crate::attributes::SessionAttributes;
use crate::config::SkillConfig;
use crate::response::Response;
use crate::states::DialogState;
use crate::transitions::TransitionDecl;
use crate::triggers::Trigger;
use super::SearchFields;

type Attrs = SessionAttributes<SearchFields>;

fn query(attrs: &Attrs) -> &str {
    attrs.slot("query").unwrap_or("that")
}

pub struct InitialState {
    config: SkillConfig,
}

impl InitialState {
    pub fn new(config: &SkillConfig) -> Self {
        Self { config: config.clone() }
    }
}

impl DialogState<SearchFields> for InitialState {
    fn name(&self) -> &str { "initial" }

    fn respond(&self, attrs: &Attrs) -> Response {
        if attrs.fields.first_time_user {
            Response::new(
                format!(
                    "Welcome to {}. I can find skills by name or topic, one at a time. {}",
                    self.config.skill_name, self.config.default_prompt
                ),
                self.config.default_prompt.clone(),
            )
        } else {
            Response::welcome(&self.config)
        }
    }
}

pub struct NoResultState {
    prompt: String,
}

impl NoResultState {
    pub fn new(config: &SkillConfig) -> Self {
        Self { prompt: config.default_prompt.clone() }
    }
}

impl DialogState<SearchFields> for NoResultState {
    fn name(&self) -> &str { "no_result" }

    fn respond(&self, attrs: &Attrs) -> Response {
        Response::new(
            format!("You asked for {}, I could not find any such skills. Please rephrase.", query(attrs)),
            self.prompt.clone(),
        )
    }

    fn transitions(&self) -> Vec<TransitionDecl> {
        vec![
            TransitionDecl::on(Trigger::search()).from_any().prepare("search").guard("no_results"),
        ]
    }
}

/// Presents the result under the cursor.
pub struct HasResultState {
    prompt: String,
}

impl HasResultState {
    pub fn new(config: &SkillConfig) -> Self {
        Self { prompt: config.default_prompt.clone() }
    }
}

impl DialogState<SearchFields> for HasResultState {
    fn name(&self) -> &str { "has_result" }

    fn respond(&self, attrs: &Attrs) -> Response {
        let (Some(result), Some(item)) = (&attrs.fields.result, attrs.fields.current()) else {
            return Response::new(format!("I lost track of your search. {}", self.prompt), self.prompt.clone());
        };

        let q = query(attrs);
        let speech = if result.items.len() == 1 {
            format!(
                "You asked for {}. The only skill I could find is {}. Would you like to hear more about it?",
                q, item.verbal()
            )
        } else {
            format!(
                "Searching for {}. Result #{} of {} is {}. Does that sound like what you want?",
                q, attrs.fields.skill_cursor + 1, result.total, item.verbal()
            )
        };

        Response::new(speech, self.prompt.clone())
            .card(format!("Search for \"{}\"", q))
            .card_body(format!("Top result: {}\n\n{}", item.name, item.description))
    }

    fn transitions(&self) -> Vec<TransitionDecl> {
        vec![
            TransitionDecl::on(Trigger::search()).from_any()
                .prepare("search").guard("has_results").after("reset_cursor"),
            TransitionDecl::on(Trigger::next()).from_each(["has_result", "describing"])
                .prepare("search").guard("has_next").after("advance_cursor"),
        ]
    }
}

pub struct DescribingState {
    prompt: String,
}

impl DescribingState {
    pub fn new(config: &SkillConfig) -> Self {
        Self { prompt: config.default_prompt.clone() }
    }
}

impl DialogState<SearchFields> for DescribingState {
    fn name(&self) -> &str { "describing" }

    fn respond(&self, attrs: &Attrs) -> Response {
        let Some(item) = attrs.fields.current() else {
            return Response::new(format!("I lost track of that skill. {}", self.prompt), self.prompt.clone());
        };

        let rating = if item.num_ratings > 0 {
            format!("{:.1} (from {} reviews)", item.avg_rating, item.num_ratings)
        } else {
            "No reviews yet".to_string()
        };
        let said_rating = item.verbal_ratings(false);
        let speech = if said_rating.is_empty() {
            format!("Okay, just tell me when to stop. {}. {}", item.name, item.description)
        } else {
            format!("Okay, just tell me when to stop. {} {}. {}", item.name, said_rating, item.description)
        };

        let mut response = Response::new(speech, "Will that be all?")
            .card(item.name.clone())
            .card_body(format!(
                "Creator: {}\nCategory: {}\nAverage rating: {}\n{}",
                item.creator.as_deref().unwrap_or("unknown"), item.category, rating, item.description
            ));
        if let Some(url) = &item.image_url {
            response = response.image(url.clone());
        }
        response
    }

    fn transitions(&self) -> Vec<TransitionDecl> {
        vec![TransitionDecl::on(Trigger::yes()).from("has_result").prepare("search").guard("has_results")]
    }
}

/// Asks for a new search.
pub struct SearchPromptState {
    prompt: String,
}

impl SearchPromptState {
    pub fn new(config: &SkillConfig) -> Self {
        Self { prompt: config.default_prompt.clone() }
    }
}

impl DialogState<SearchFields> for SearchPromptState {
    fn name(&self) -> &str { "search_prompt" }

    fn respond(&self, _attrs: &Attrs) -> Response {
        Response::new(self.prompt.clone(), self.prompt.clone())
    }

    fn transitions(&self) -> Vec<TransitionDecl> {
        vec![TransitionDecl::on(Trigger::no()).from_each(["has_result", "describing", "is_that_all"])]
    }
}

pub struct IsThatAllState;

impl DialogState<SearchFields> for IsThatAllState {
    fn name(&self) -> &str { "is_that_all" }

    fn respond(&self, _attrs: &Attrs) -> Response {
        Response::new("Okay, will that be all?", "Will that be all?")
    }

    fn transitions(&self) -> Vec<TransitionDecl> {
        vec![
            TransitionDecl::on(Trigger::cancel()).from("describing"),
            TransitionDecl::on(Trigger::stop()).from("describing"),
        ]
    }
}

pub struct ExitingState {
    config: SkillConfig,
}

impl ExitingState {
    pub fn new(config: &SkillConfig) -> Self {
        Self { config: config.clone() }
    }
}

impl DialogState<SearchFields> for ExitingState {
    fn name(&self) -> &str { "exiting" }

    fn respond(&self, _attrs: &Attrs) -> Response {
        Response::farewell(&self.config)
    }

    fn transitions(&self) -> Vec<TransitionDecl> {
        vec![
            TransitionDecl::on(Trigger::yes()).from_each(["describing", "is_that_all"]),
            TransitionDecl::on(Trigger::cancel()).from_any(),
            TransitionDecl::on(Trigger::stop()).from_any(),
        ]
    }

    fn is_terminal(&self) -> bool { true }
}
