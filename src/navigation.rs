//! The navigation bar shown at the top of every page behind the log-in.

use maud::{Markup, html};

use crate::endpoints;

/// The pages listed in the navigation bar as (url, title), in display order.
const NAV_LINKS: [(&str, &str); 3] = [
    (endpoints::DASHBOARD_VIEW, "Dashboard"),
    (endpoints::EXPENSES_VIEW, "Expenses"),
    (endpoints::NEW_EXPENSE_VIEW, "Add expense"),
];

const CURRENT_LINK_STYLE: &str = "block py-2 px-3 text-white bg-blue-700 rounded-sm \
    lg:bg-transparent lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500";

const LINK_STYLE: &str = "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100 \
    lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0 \
    dark:text-white lg:dark:hover:text-blue-500 dark:hover:bg-gray-700 \
    dark:hover:text-white lg:dark:hover:bg-transparent";

/// The navigation bar with the link for `active_endpoint` highlighted.
///
/// Pages that are not in the bar, such as the edit page, highlight nothing.
pub struct NavBar<'a> {
    active_endpoint: &'a str,
}

impl<'a> NavBar<'a> {
    pub fn new(active_endpoint: &'a str) -> Self {
        Self { active_endpoint }
    }

    fn nav_link(&self, url: &str, title: &str) -> Markup {
        let is_current = url == self.active_endpoint;
        let style = if is_current { CURRENT_LINK_STYLE } else { LINK_STYLE };

        html! {
            a href=(url) class=(style) aria-current=[is_current.then_some("page")] { (title) }
        }
    }

    pub fn into_html(self) -> Markup {
        // Layout adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html! {
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a href=(endpoints::ROOT) class="flex items-center"
                    {
                        span class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Outlay"
                        }
                    }

                    ul class="font-medium flex flex-col p-4 mt-4 w-full lg:w-auto \
                        border border-gray-100 rounded bg-gray-50 dark:bg-gray-800 dark:border-gray-700 \
                        lg:flex-row lg:space-x-8 lg:p-0 lg:mt-0 lg:border-0 lg:bg-white lg:dark:bg-gray-900"
                    {
                        @for (url, title) in NAV_LINKS {
                            li { (self.nav_link(url, title)) }
                        }

                        li { a href=(endpoints::LOG_OUT) class=(LINK_STYLE) { "Log out" } }
                    }
                }
            }
        }
    }
}
