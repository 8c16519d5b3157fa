//! The site header and the bottom tab bar shown on small screens.

use maud::{Markup, html};

use crate::endpoints;

/// A top level area of the app with its own navigation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Dashboard,
    Expenses,
    Budget,
    Analytics,
    Settings,
}

impl Section {
    /// The sections shown as tabs on small screens, in display order.
    const TABS: [Section; 4] = [
        Section::Dashboard,
        Section::Expenses,
        Section::Budget,
        Section::Analytics,
    ];

    const ALL: [Section; 5] = [
        Section::Dashboard,
        Section::Expenses,
        Section::Budget,
        Section::Analytics,
        Section::Settings,
    ];

    fn url(self) -> &'static str {
        match self {
            Section::Dashboard => endpoints::DASHBOARD_VIEW,
            Section::Expenses => endpoints::EXPENSES_VIEW,
            Section::Budget => endpoints::BUDGET_VIEW,
            Section::Analytics => endpoints::ANALYTICS_VIEW,
            Section::Settings => endpoints::SETTINGS_VIEW,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Expenses => "Expenses",
            Section::Budget => "Budget",
            Section::Analytics => "Analytics",
            Section::Settings => "Settings",
        }
    }

    /// The SVG path of the 24x24 outline icon for the tab bar.
    fn icon_path(self) -> &'static str {
        match self {
            Section::Dashboard => "M3 12l9-9 9 9M5 10v10h5v-6h4v6h5V10",
            Section::Expenses => "M4 4h16v16H4zM8 9h8M8 13h8M8 17h5",
            Section::Budget => "M12 3a9 9 0 1 0 9 9h-9z M14 3.3A9 9 0 0 1 20.7 10H14z",
            Section::Analytics => "M4 20V10M10 20V4M16 20v-7M22 20H2",
            Section::Settings => "M12 8a4 4 0 1 0 0 8 4 4 0 0 0 0-8zM4 12h2M18 12h2M12 4v2M12 18v2",
        }
    }

    /// The section that `path` belongs to.
    ///
    /// Sub-pages such as `/expenses/new` or `/budget/categories/3/edit` belong
    /// to the section whose URL prefixes them.
    fn for_path(path: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|section| {
            let url = section.url();

            path.strip_prefix(url)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}

const DESKTOP_LINK_STYLE: &str = "rounded-md px-3 py-2 text-sm font-medium text-gray-600 \
    hover:bg-gray-100 hover:text-gray-900 dark:text-gray-300 dark:hover:bg-gray-800 \
    dark:hover:text-white";
const DESKTOP_ACTIVE_LINK_STYLE: &str = "rounded-md px-3 py-2 text-sm font-semibold \
    bg-emerald-50 text-emerald-700 dark:bg-emerald-900/40 dark:text-emerald-300";
const TAB_STYLE: &str = "flex flex-col items-center gap-1 py-2 text-xs font-medium \
    text-gray-500 dark:text-gray-400";
const ACTIVE_TAB_STYLE: &str = "flex flex-col items-center gap-1 py-2 text-xs font-semibold \
    text-emerald-600 dark:text-emerald-400";

/// The navigation for a page, highlighting the section of the current page.
pub struct NavBar {
    active: Option<Section>,
}

impl NavBar {
    /// Create the navigation for the page at `active_endpoint`.
    ///
    /// Paths outside every section, such as the log-in page, highlight nothing.
    pub fn new(active_endpoint: &str) -> NavBar {
        NavBar {
            active: Section::for_path(active_endpoint),
        }
    }

    fn is_active(&self, section: Section) -> bool {
        self.active == Some(section)
    }

    fn desktop_link(&self, section: Section) -> Markup {
        let is_active = self.is_active(section);
        let style = if is_active {
            DESKTOP_ACTIVE_LINK_STYLE
        } else {
            DESKTOP_LINK_STYLE
        };

        html!(
            a
                href=(section.url())
                class=(style)
                aria-current=[is_active.then_some("page")]
            { (section.title()) }
        )
    }

    fn tab(&self, section: Section) -> Markup {
        let is_active = self.is_active(section);
        let style = if is_active { ACTIVE_TAB_STYLE } else { TAB_STYLE };

        html!(
            a
                href=(section.url())
                class=(style)
                aria-current=[is_active.then_some("page")]
                data-tab
            {
                (tab_icon(section))
                span { (section.title()) }
            }
        )
    }

    pub fn into_html(self) -> Markup {
        html!(
            header
                class="sticky top-0 z-40 border-b border-gray-200 bg-white/90 backdrop-blur
                dark:border-gray-800 dark:bg-gray-900/90"
            {
                nav
                    class="mx-auto flex max-w-screen-xl items-center justify-between px-4 py-3"
                    aria-label="Main"
                {
                    a href=(endpoints::DASHBOARD_VIEW) class="flex items-center gap-2"
                    {
                        img src="/static/favicon-128x128.png" alt="" class="h-7 w-7";
                        span class="text-lg font-bold text-gray-900 dark:text-white"
                        {
                            "CashCompass"
                        }
                    }

                    ul class="hidden items-center gap-1 lg:flex"
                    {
                        @for section in Section::TABS {
                            li { (self.desktop_link(section)) }
                        }
                    }

                    div class="flex items-center gap-1"
                    {
                        (self.desktop_link(Section::Settings))
                        a href=(endpoints::LOG_OUT) class=(DESKTOP_LINK_STYLE) { "Log out" }
                    }
                }
            }

            nav
                class="fixed inset-x-0 bottom-0 z-40 border-t border-gray-200 bg-white
                pb-[env(safe-area-inset-bottom)] dark:border-gray-800 dark:bg-gray-900 lg:hidden"
                aria-label="Sections"
            {
                ul class="grid grid-cols-4"
                {
                    @for section in Section::TABS {
                        li { (self.tab(section)) }
                    }
                }
            }
        )
    }
}

fn tab_icon(section: Section) -> Markup {
    html!(
        svg
            class="h-6 w-6"
            xmlns="http://www.w3.org/2000/svg"
            viewBox="0 0 24 24"
            fill="none"
            stroke="currentColor"
            stroke-width="1.5"
            stroke-linecap="round"
            stroke-linejoin="round"
            aria-hidden="true"
        {
            path d=(section.icon_path()) {}
        }
    )
}
