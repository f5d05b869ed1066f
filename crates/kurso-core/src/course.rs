//! Static course directory.
//!
//! The course "Social Design Foundations" is configuration data, not state:
//! a fixed, ordered set of modules with their tutoring prompt templates.
//! Nothing here mutates at runtime.

use minijinja::{Environment, context};

use crate::error::{KursoError, Result};

/// Course title shown to the model and the user.
pub const COURSE_TITLE: &str = "Social Design Foundations";

/// The module every fresh session starts in.
pub const FIRST_MODULE_ID: &str = "1.1";

/// A single course module.
///
/// `next` links modules into their study order; the last module carries
/// `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Module {
    pub id: &'static str,
    pub title: &'static str,
    pub prompt_template: &'static str,
    pub next: Option<&'static str>,
}

/// Shared tutor framing rendered at the top of every module prompt.
const TUTOR_PREAMBLE: &str = r#"Ты — наставник интерактивного курса «{{ course_title }}»
о проектировании кооперативных форматов: встреч, сообществ и совместной работы.
Сейчас идёт модуль {{ module_id }} из {{ module_count }}: «{{ module_title }}».

Правила ведения диалога:
- Веди занятие на русском языке, коротко и по делу.
- Двигайся маленькими шагами: один вопрос или одно упражнение за раз.
- Опирайся на примеры из жизни ученика, проси его приводить свои.
- Не читай длинных лекций; каждую реплику заканчивай вопросом или заданием.
{% if next_module_id %}- Когда ученик уверенно справился с материалом, предложи ему
  написать «следующий модуль», чтобы перейти к модулю {{ next_module_id }}.
{% else %}- Это последний модуль курса. В конце подведи итоги всего пройденного.
{% endif %}"#;

const MODULE_1_1_BODY: &str = r#"
Содержание модуля:
1. Что такое социальное проектирование: отличие спроектированного
   взаимодействия от стихийного.
2. Три слоя любого формата: цель, структура, атмосфера.
3. Разбор знакомых форматов (планёрка, день рождения, книжный клуб)
   по этим трём слоям.

Начни с короткого приветствия и спроси, в каких повторяющихся встречах
ученик участвует, — дальше строй разбор на его примерах."#;

const MODULE_1_2_BODY: &str = r#"
Содержание модуля:
1. Кооперативные и конкурентные форматы: чем отличаются стимулы участников.
2. Роли и ротация ролей: ведущий, хранитель времени, секретарь.
3. Правила входа и выхода: как формат принимает новичков и отпускает
   уставших.

Опирайся на примеры из модуля 1.1. Предложи ученику взять одну его
реальную встречу и перепроектировать её стимулы в кооперативную сторону."#;

const MODULE_1_3_BODY: &str = r#"
Содержание модуля:
1. Проектирование собственного формата с нуля: от цели к структуре.
2. Прототипирование: как провести первый «черновой» запуск и что измерять.
3. Итерации: разбор того, что пошло не так, без поиска виноватых.

Это итоговый модуль. Помоги ученику спроектировать один собственный
формат целиком и составить план первого запуска."#;

static MODULES: &[Module] = &[
    Module {
        id: "1.1",
        title: "Основы социального проектирования",
        prompt_template: MODULE_1_1_BODY,
        next: Some("1.2"),
    },
    Module {
        id: "1.2",
        title: "Кооперативные форматы",
        prompt_template: MODULE_1_2_BODY,
        next: Some("1.3"),
    },
    Module {
        id: "1.3",
        title: "Проектирование собственного формата",
        prompt_template: MODULE_1_3_BODY,
        next: None,
    },
];

/// Read-only access to the course module directory.
pub struct Course;

impl Course {
    /// All modules in study order.
    pub fn modules() -> &'static [Module] {
        MODULES
    }

    /// Looks up a module by id.
    pub fn get(module_id: &str) -> Option<&'static Module> {
        MODULES.iter().find(|module| module.id == module_id)
    }

    /// The first module of the course.
    pub fn first() -> &'static Module {
        &MODULES[0]
    }

    /// The id of the module following `module_id`, if any.
    pub fn next_of(module_id: &str) -> Option<&'static str> {
        Self::get(module_id).and_then(|module| module.next)
    }

    /// Renders the full system prompt for a module: the shared tutor
    /// preamble followed by the module's own outline.
    ///
    /// # Errors
    ///
    /// Returns `KursoError::NotFound` for an unknown module id and
    /// `KursoError::Template` if rendering fails.
    pub fn system_prompt(module_id: &str) -> Result<String> {
        let module =
            Self::get(module_id).ok_or_else(|| KursoError::not_found("module", module_id))?;

        let env = Environment::new();
        let source = format!("{TUTOR_PREAMBLE}\n{}", module.prompt_template);
        let template = env
            .template_from_str(&source)
            .map_err(|e| KursoError::Template(e.to_string()))?;

        template
            .render(context! {
                course_title => COURSE_TITLE,
                module_id => module.id,
                module_title => module.title,
                module_count => MODULES.len(),
                next_module_id => module.next,
            })
            .map_err(|e| KursoError::Template(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modules_form_a_linear_chain() {
        assert_eq!(Course::first().id, FIRST_MODULE_ID);
        assert_eq!(Course::next_of("1.1"), Some("1.2"));
        assert_eq!(Course::next_of("1.2"), Some("1.3"));
        assert_eq!(Course::next_of("1.3"), None);

        // Every next link must point at an existing module.
        for module in Course::modules() {
            if let Some(next) = module.next {
                assert!(Course::get(next).is_some(), "dangling next link: {next}");
            }
        }
    }

    #[test]
    fn unknown_module_is_not_found() {
        assert!(Course::get("9.9").is_none());
        let err = Course::system_prompt("9.9").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn system_prompt_includes_module_context() {
        let prompt = Course::system_prompt("1.1").unwrap();
        assert!(prompt.contains(COURSE_TITLE));
        assert!(prompt.contains("Основы социального проектирования"));
        assert!(prompt.contains("модуль 1.1"));
        // Non-terminal modules advertise the navigation phrase.
        assert!(prompt.contains("следующий модуль"));
    }

    #[test]
    fn last_module_prompt_has_no_navigation_hint() {
        let prompt = Course::system_prompt("1.3").unwrap();
        assert!(!prompt.contains("следующий модуль"));
        assert!(prompt.contains("последний модуль"));
    }
}
