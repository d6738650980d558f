//! Python fragments stitched together by [`super::fallback_script`].

/// Module header and class opening, before the escaped raw texts.
pub(super) const HEADER: &str = "from manim import *\n\n\nclass DoubtAnimationScene(Scene):\n";

/// Opening of `construct`.
pub(super) const CONSTRUCT: &str = "\n    def construct(self):\n";

/// Closing of `construct`.
pub(super) const CONSTRUCT_END: &str = "\n        self.wait(1)\n        self.clear_all_mobjects()\n";

/// Helper methods shared by every fallback scene.
pub(super) const HELPERS: &str = r#"
    def show_title(self, heading, color):
        title = Text(heading, font_size=36, color=color)
        title.to_edge(UP + LEFT, buff=0.5)
        self.play(Write(title))
        self.wait(0.5)
        return title

    def show_page(self, title, lines):
        page = VGroup()
        for line in lines:
            text = Text(line, font_size=22)
            if len(page) == 0:
                text.next_to(title, DOWN, aligned_edge=LEFT, buff=0.3)
            else:
                text.next_to(page[len(page) - 1], DOWN, aligned_edge=LEFT, buff=0.2)
            page.add(text)
        for text in page:
            self.play(Write(text), run_time=0.5)
        return page

    def clear_page(self, page):
        self.play(FadeOut(page))
        self.remove(page)

    def clear_all_mobjects(self):
        if self.mobjects:
            self.play(*[FadeOut(mob) for mob in self.mobjects])
        self.remove(*self.mobjects)
"#;

/// Parabola and tangent built from Line, Dot, and Text only (no LaTeX).
pub(super) const DERIVATIVE_VISUAL: &str = r#"
    def show_derivative_visual(self):
        x_axis = Line(LEFT * 3, RIGHT * 3, color=WHITE)
        y_axis = Line(DOWN * 1, UP * 4.5, color=WHITE)
        x_label = Text("x", font_size=20, color=WHITE).next_to(x_axis, RIGHT)
        y_label = Text("y", font_size=20, color=WHITE).next_to(y_axis, UP)
        ticks = VGroup()
        for i in range(-2, 3):
            if i == 0:
                continue
            tick = Line(DOWN * 0.1, UP * 0.1, color=WHITE).move_to(np.array([i, 0, 0]))
            ticks.add(tick)
            ticks.add(Text(str(i), font_size=16, color=WHITE).next_to(tick, DOWN, buff=0.1))
        axes = VGroup(x_axis, y_axis, x_label, y_label, ticks)

        points = [np.array([x, x ** 2, 0]) for x in np.linspace(-2, 2, 30)]
        curve = VGroup()
        for i in range(len(points) - 1):
            curve.add(Line(points[i], points[i + 1], color=BLUE))

        tangent_dot = Dot(np.array([1, 1, 0]), color=RED)
        tangent_line = Line(np.array([0, -1, 0]), np.array([2, 3, 0]), color=RED)

        graph = VGroup(axes, curve, tangent_dot, tangent_line)
        graph.scale(0.6).shift(DOWN * 1.5)

        func_label = Text("f(x) = x²", font_size=20, color=BLUE)
        deriv_label = Text("f'(x) = 2x", font_size=20, color=RED)
        slope_label = Text("Slope at x=1: f'(1) = 2", font_size=18, color=RED)
        labels = VGroup(func_label, deriv_label, slope_label).arrange(DOWN, aligned_edge=LEFT)
        labels.to_corner(UR, buff=0.5)

        self.play(Create(axes))
        self.play(Create(curve), Write(func_label))
        self.play(Create(tangent_dot), Create(tangent_line))
        self.play(Write(deriv_label), Write(slope_label))
        self.wait(3)
        self.play(FadeOut(graph), FadeOut(labels))
        self.remove(graph, labels)
"#;
