//! Scene prompt composition.

use super::template::{TemplateError, render_template};
use crate::scene::ENTRY_SYMBOL;

/// A generation request: a system instruction plus the user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenePrompt {
    /// Role-setting instruction sent ahead of the request.
    pub system: String,
    /// The request itself, embedding the question, answer, and constraints.
    pub user: String,
}

const SYSTEM_TEMPLATE: &str = "\
You are an expert Python programmer specializing in Manim animations for educational content. \
Return only executable Python code with no explanations or comments outside the code. \
ALWAYS define all variables before using them. \
ONLY use standard Manim classes that exist in Manim CE, not custom ones unless you define them yourself. \
If creating 3D scenes, inherit from ThreeDScene rather than instantiating it. \
Create animations with text on the left and diagrams on the right. \
The scene class must be named {entry_symbol}.";

const USER_TEMPLATE: &str = r#"You are an expert in mathematics and visualization who will create a Manim animation script to explain a student's doubt.

The student has asked: "{question}"

An answer has been provided: "{answer}"

Create a Python Manim script that will:
1. Create a visually engaging explanation using Manim's animation capabilities
2. Include relevant visualizations and graphics that help explain the concepts
3. Break down complex ideas into visual components
4. Structure the animation in a logical teaching sequence

IMPORTANT REQUIREMENTS:
- The script must be complete and immediately runnable with Manim Community Edition
- Name your main class "{entry_symbol}"
- Include all necessary imports at the top, starting with: from manim import *
- ALWAYS define any variables before using them (e.g. declare 'font_size = 22' at the start of construct)

SCENE CLASS REQUIREMENTS:
- For 2D animations inherit from Scene: class {entry_symbol}(Scene):
- For 3D animations inherit from ThreeDScene: class {entry_symbol}(ThreeDScene):
- NEVER create instances of Scene or ThreeDScene; they are base classes to inherit from
- For 3D scenes adjust the camera inside construct with self.set_camera_orientation(phi=75*DEGREES, theta=-45*DEGREES)

LAYOUT REQUIREMENTS:
- Split the screen: all Text objects on the LEFT half, all diagrams and graphics on the RIGHT half
- Position text with text_element.to_edge(LEFT, buff=0.5) and diagrams with diagram.to_edge(RIGHT, buff=1.0)
- Keep text on the left throughout; update the diagram on the right as concepts progress

SAFE INDEXING REQUIREMENTS:
- Before indexing into a VGroup, Text, or MathTex (e.g. group[2]), check len(group) is large enough
- Never index submobjects of MathTex by guessed position; color whole expressions instead
- Never assume self.mobjects is non-empty

ALLOWED PRIMITIVES:
- Text, MathTex, Line, Dot, Circle, Square, Rectangle, Polygon, Arrow, VGroup, NumberPlane, Axes
- Build right triangles with Polygon(*[ORIGIN, RIGHT*3, UP*2], fill_opacity=0.5, color=BLUE)
- Any other shape must be built from these primitives inside the script

DISPLAY REQUIREMENTS:
- Text must NEVER overflow the bottom of the frame
- Show at most {lines_per_page} lines of text at once, then fade them out and show the next set
- Use font sizes between 20 and 22 for content text
- After fading out objects ALWAYS remove them with self.remove()
- Implement a clear_all_mobjects helper method and call it between sections

Provide STRICTLY ONLY the Python code for the Manim script, with absolutely no explanation text before or after the code."#;

/// Compose the generation prompt for a question and its answer.
///
/// The output depends only on the arguments.
pub fn build_prompt(
    question: &str,
    answer: &str,
    lines_per_page: usize,
) -> Result<ScenePrompt, TemplateError> {
    let lines_per_page = lines_per_page.to_string();
    let system = render_template(SYSTEM_TEMPLATE, &[("entry_symbol", ENTRY_SYMBOL)])?;
    let user = render_template(
        USER_TEMPLATE,
        &[
            ("question", question.trim()),
            ("answer", answer.trim()),
            ("entry_symbol", ENTRY_SYMBOL),
            ("lines_per_page", &lines_per_page),
        ],
    )?;

    Ok(ScenePrompt { system, user })
}
